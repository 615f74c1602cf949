//! Delivery receipts
//!
//! A receipt is a pure document derived from a request and its delivered
//! items; it can be regenerated at any time. Turning it into PDF bytes is
//! the rendering collaborator's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::{Request, RequestItem};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub request_id: String,
    pub caseworker: String,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub item: String,
    pub quantity: u32,
}

/// Build a receipt stamped with the current time.
pub fn generate_receipt(request: &Request, delivered: &[RequestItem]) -> Receipt {
    generate_receipt_at(request, delivered, Utc::now())
}

/// Build a receipt with an explicit issue time. Pure and idempotent: the
/// same inputs always produce the same document.
pub fn generate_receipt_at(
    request: &Request,
    delivered: &[RequestItem],
    issued_at: DateTime<Utc>,
) -> Receipt {
    Receipt {
        request_id: request.id.clone(),
        caseworker: request.caseworker.label().to_string(),
        issued_at,
        lines: delivered
            .iter()
            .map(|item| ReceiptLine {
                item: item.name.clone(),
                quantity: item.quantity,
            })
            .collect(),
    }
}

impl Receipt {
    /// Fixed layout: title, three header lines, then a two-column table.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Delivery Receipt\n");
        out.push_str(&format!("Request: {}\n", self.request_id));
        out.push_str(&format!("Caseworker: {}\n", self.caseworker));
        out.push_str(&format!(
            "Date: {}\n",
            self.issued_at.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push('\n');
        out.push_str(&format!("{:<40} {:>5}\n", "Item", "Qty"));
        out.push_str(&format!("{:-<46}\n", ""));
        for line in &self.lines {
            out.push_str(&format!("{:<40} {:>5}\n", line.item, line.quantity));
        }
        out
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Download name for the exported artifact
    pub fn file_name(&self) -> String {
        format!("receipt-{}.txt", self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Caseworker, Family};

    fn request_with_delivery() -> (Request, Vec<RequestItem>) {
        let request = Request::new(
            Caseworker {
                name: "Dana Reyes".into(),
                email: "dana@example.org".into(),
                uid: "cw-1".into(),
            },
            vec![Family {
                client_name: "Smith".into(),
                items: vec![],
                notes: None,
            }],
        );
        let delivered = vec![
            RequestItem {
                name: "Winter Coat".into(),
                quantity: 5,
                notes: None,
            },
            RequestItem {
                name: "Rice 5lb".into(),
                quantity: 2,
                notes: None,
            },
        ];
        (request, delivered)
    }

    #[test]
    fn test_generate_receipt_idempotent() {
        let (request, delivered) = request_with_delivery();
        let at = Utc::now();
        let first = generate_receipt_at(&request, &delivered, at);
        let second = generate_receipt_at(&request, &delivered, at);
        assert_eq!(first, second);
        assert_eq!(first.render_text(), second.render_text());
    }

    #[test]
    fn test_receipt_contents() {
        let (request, delivered) = request_with_delivery();
        let receipt = generate_receipt(&request, &delivered);
        assert_eq!(receipt.request_id, request.id);
        assert_eq!(receipt.caseworker, "Dana Reyes");
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].item, "Winter Coat");
        assert_eq!(receipt.lines[0].quantity, 5);
    }

    #[test]
    fn test_render_text_layout() {
        let (request, delivered) = request_with_delivery();
        let receipt = generate_receipt(&request, &delivered);
        let text = receipt.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Delivery Receipt");
        assert!(lines[1].starts_with("Request: "));
        assert!(lines[2].starts_with("Caseworker: "));
        assert!(lines[3].starts_with("Date: "));
        assert!(text.contains("Winter Coat"));
        assert!(text.contains("Rice 5lb"));
    }

    #[test]
    fn test_caseworker_falls_back_to_email() {
        let (mut request, delivered) = request_with_delivery();
        request.caseworker.name = String::new();
        let receipt = generate_receipt(&request, &delivered);
        assert_eq!(receipt.caseworker, "dana@example.org");
    }

    #[test]
    fn test_file_name() {
        let (request, delivered) = request_with_delivery();
        let receipt = generate_receipt(&request, &delivered);
        assert_eq!(receipt.file_name(), format!("receipt-{}.txt", request.id));
    }
}
