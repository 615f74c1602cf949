//! Dashboard statistics

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::request::{Request, RequestStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub pending_requests: usize,
    pub completed_today: usize,
    pub recent_requests: Vec<RecentRequest>,
    pub request_trends: RequestTrends,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRequest {
    pub id: String,
    pub client_name: String,
    pub status: RequestStatus,
    pub date: String,
}

/// Submissions per day over the trailing week, oldest first
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTrends {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

/// Compute the admin dashboard from a request snapshot.
///
/// `now` is injected so the day boundaries are testable.
pub fn compute_stats(requests: &[Request], total_users: usize, now: DateTime<Utc>) -> DashboardStats {
    let pending_requests = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();

    let start_of_today = start_of_day(now);
    let completed_today = requests
        .iter()
        .filter(|r| {
            r.status == RequestStatus::Approved
                && r.resolved_at.map_or(false, |at| at >= start_of_today)
        })
        .count();

    let mut by_date: Vec<&Request> = requests.iter().collect();
    by_date.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    let recent_requests = by_date
        .iter()
        .take(10)
        .map(|r| RecentRequest {
            id: r.id.clone(),
            client_name: r
                .families
                .first()
                .map(|f| f.client_name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            status: r.status,
            date: r.submitted_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let mut labels = Vec::with_capacity(7);
    let mut data = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let day_start = start_of_today - Duration::days(offset);
        let day_end = day_start + Duration::days(1);
        labels.push(day_start.format("%a").to_string());
        data.push(
            requests
                .iter()
                .filter(|r| r.submitted_at >= day_start && r.submitted_at < day_end)
                .count() as u64,
        );
    }

    DashboardStats {
        total_users,
        pending_requests,
        completed_today,
        recent_requests,
        request_trends: RequestTrends { labels, data },
    }
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Caseworker, Family, RequestItem};

    fn request_at(submitted_at: DateTime<Utc>) -> Request {
        let mut request = Request::new(
            Caseworker {
                name: "Dana Reyes".into(),
                email: "dana@example.org".into(),
                uid: "cw-1".into(),
            },
            vec![Family {
                client_name: "Smith".into(),
                items: vec![RequestItem {
                    name: "Winter Coat".into(),
                    quantity: 1,
                    notes: None,
                }],
                notes: None,
            }],
        );
        request.submitted_at = submitted_at;
        request
    }

    #[test]
    fn test_pending_and_completed_counts() {
        let now = Utc::now();
        let pending = request_at(now);
        let mut approved_today = request_at(now);
        approved_today.approve(vec![]).unwrap();
        let mut approved_last_week = request_at(now - Duration::days(6));
        approved_last_week.approve(vec![]).unwrap();
        approved_last_week.resolved_at = Some(now - Duration::days(6));

        let stats = compute_stats(&[pending, approved_today, approved_last_week], 4, now);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.pending_requests, 1);
        assert_eq!(stats.completed_today, 1);
    }

    #[test]
    fn test_recent_requests_newest_first_capped_at_ten() {
        let now = Utc::now();
        let requests: Vec<Request> = (0..12)
            .map(|i| request_at(now - Duration::hours(i)))
            .collect();
        let newest_id = requests[0].id.clone();

        let stats = compute_stats(&requests, 0, now);
        assert_eq!(stats.recent_requests.len(), 10);
        assert_eq!(stats.recent_requests[0].id, newest_id);
        assert_eq!(stats.recent_requests[0].client_name, "Smith");
    }

    #[test]
    fn test_trends_cover_seven_days() {
        let now = Utc::now();
        let requests = vec![
            request_at(now),
            request_at(now),
            request_at(now - Duration::days(3)),
        ];

        let stats = compute_stats(&requests, 0, now);
        assert_eq!(stats.request_trends.labels.len(), 7);
        assert_eq!(stats.request_trends.data.len(), 7);
        assert_eq!(stats.request_trends.data[6], 2);
        assert_eq!(stats.request_trends.data[3], 1);
        assert_eq!(stats.request_trends.data.iter().sum::<u64>(), 3);
    }
}
