use statsd::Client;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct MetricsService {
    client: Arc<Client>,
}

impl MetricsService {
    pub fn new(host: &str, port: u16, prefix: &str) -> Self {
        let client = Arc::new(Client::new(format!("{}:{}", host, port), prefix).unwrap());
        Self { client }
    }

    pub fn increment(&self, metric: &str, tags: Option<HashMap<String, String>>) {
        self.client.incr(&metric_with_tags(metric, tags));
    }

    pub fn timing(
        &self,
        metric: &str,
        duration: std::time::Duration,
        tags: Option<HashMap<String, String>>,
    ) {
        self.client
            .timer(&metric_with_tags(metric, tags), duration.as_millis() as f64);
    }
}

fn metric_with_tags(metric: &str, tags: Option<HashMap<String, String>>) -> String {
    match tags {
        Some(tags) if !tags.is_empty() => {
            let tag_string = tags
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<String>>()
                .join(",");
            format!("{}#{}", metric, tag_string)
        }
        _ => metric.to_string(),
    }
}
