use serde::{Deserialize, Serialize};

/// One denormalized customer row from the CUSTOMER/COUNTRY join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub dob: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_name: String,
    pub gender: Option<String>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One subscription stream event from the delimited streams file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub stream_id: Option<String>,
    pub customer_id: i64,
    pub subscription_stopped: Option<f64>,
    pub invoice_item_id: Option<i64>,
}

impl StreamEvent {
    /// Rows without a stream id carry no usable event and are dropped
    /// before any per-customer aggregation.
    pub fn has_stream_id(&self) -> bool {
        self.stream_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    pub fn stopped(&self) -> bool {
        self.subscription_stopped.unwrap_or(0.0) > 0.0
    }
}

/// Final analytical row, one per customer with stream activity.
/// Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub customer_id: i64,
    pub country_name: String,
    pub age: Option<i64>,
    pub customer_name: String,
    pub is_subscriber: bool,
    pub subscription_type: String,
    pub num_streams: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(stream_id: Option<&str>, stopped: Option<f64>) -> StreamEvent {
        StreamEvent {
            stream_id: stream_id.map(str::to_string),
            customer_id: 1,
            subscription_stopped: stopped,
            invoice_item_id: Some(1),
        }
    }

    #[test]
    fn missing_or_blank_stream_ids_are_rejected() {
        assert!(event(Some("s-1"), None).has_stream_id());
        assert!(!event(None, None).has_stream_id());
        assert!(!event(Some(""), None).has_stream_id());
        assert!(!event(Some("   "), None).has_stream_id());
    }

    #[test]
    fn stopped_defaults_to_false_when_absent() {
        assert!(event(Some("s-1"), Some(1.0)).stopped());
        assert!(!event(Some("s-1"), Some(0.0)).stopped());
        assert!(!event(Some("s-1"), None).stopped());
    }
}
