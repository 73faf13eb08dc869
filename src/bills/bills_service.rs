use std::sync::Arc;

use crate::{
    bills::dto::bill_list_response::BillListItem,
    commons::{
        document_store::{BillDocument, DocumentStore, StoreError},
        format,
    },
};

pub struct BillsService {
    document_store: Option<Arc<dyn DocumentStore>>,
}

impl BillsService {
    pub fn new(document_store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { document_store }
    }

    pub async fn get_bills(&self, user_email: &str) -> Result<Vec<BillListItem>, StoreError> {
        let store = match &self.document_store {
            Some(store) => store,
            // No store handle yet means "not connected", not an error
            None => return Ok(Vec::new()),
        };

        let docs = store.get_bills().await?;

        let bills = docs
            .into_iter()
            .map(to_list_item)
            .filter(|bill| bill.email == user_email)
            .collect();

        Ok(bills)
    }
}

fn to_list_item(doc: BillDocument) -> BillListItem {
    let BillDocument { id, record } = doc;

    let (date, sort_date) = match format::parse_date(&record.date) {
        Ok(parsed) => (format::display_date(&parsed), Some(parsed)),
        Err(e) => {
            // A single malformed document must not fail the whole fetch;
            // keep the raw value and move on
            log::warn!("keeping raw date {:?} for bill {}: {}", record.date, id, e);
            (record.date.clone(), None)
        }
    };

    BillListItem {
        id,
        expense_type: record.expense_type,
        name: record.name,
        amount: record.amount,
        date,
        vat: record.vat,
        pct: record.pct,
        commentary: record.commentary,
        file_url: record.file_url,
        file_name: record.file_name,
        status: format::format_status(&record.status),
        sort_date,
        email: record.email,
    }
}

// Presentation-side "latest to earliest" ordering, on the canonical date.
// Records whose date could not be parsed sort last.
pub fn order_latest_first(bills: &mut [BillListItem]) {
    bills.sort_by(|a, b| b.sort_date.cmp(&a.sort_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bill::Bill;
    use async_trait::async_trait;

    fn bill(email: &str, date: &str, status: &str) -> Bill {
        Bill {
            email: email.to_string(),
            expense_type: "Travels".to_string(),
            name: "Flight".to_string(),
            amount: 348.0,
            date: date.to_string(),
            vat: "70".to_string(),
            pct: 20,
            commentary: String::new(),
            file_url: None,
            file_name: None,
            status: status.to_string(),
        }
    }

    struct FakeStore {
        docs: Vec<BillDocument>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentStore for FakeStore {
        async fn get_bills(&self) -> Result<Vec<BillDocument>, StoreError> {
            if self.fail {
                return Err(StoreError::Status(reqwest::StatusCode::BAD_GATEWAY));
            }
            Ok(self.docs.clone())
        }

        async fn add_bill(&self, _record: &Bill) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn service_with(docs: Vec<BillDocument>) -> BillsService {
        BillsService::new(Some(Arc::new(FakeStore { docs, fail: false })))
    }

    #[tokio::test]
    async fn resolves_empty_without_a_store() {
        let service = BillsService::new(None);
        let bills = service.get_bills("employee@test.tld").await.unwrap();
        assert!(bills.is_empty());
    }

    #[tokio::test]
    async fn keeps_only_the_current_users_bills() {
        let service = service_with(vec![
            BillDocument {
                id: "1".to_string(),
                record: bill("employee@test.tld", "2023-10-10", "pending"),
            },
            BillDocument {
                id: "2".to_string(),
                record: bill("someone-else@test.tld", "2023-10-11", "pending"),
            },
        ]);

        let bills = service.get_bills("employee@test.tld").await.unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].id, "1");
    }

    #[tokio::test]
    async fn empty_email_matches_nothing() {
        let service = service_with(vec![BillDocument {
            id: "1".to_string(),
            record: bill("employee@test.tld", "2023-10-10", "pending"),
        }]);

        let bills = service.get_bills("").await.unwrap();
        assert!(bills.is_empty());
    }

    #[tokio::test]
    async fn formats_date_and_status_for_display() {
        let service = service_with(vec![BillDocument {
            id: "1".to_string(),
            record: bill("employee@test.tld", "2023-10-10", "refused"),
        }]);

        let bills = service.get_bills("employee@test.tld").await.unwrap();
        assert_eq!(bills[0].date, "Oct. 10, 2023");
        assert_eq!(bills[0].status, "Cancelled");
        assert_eq!(bills[0].sort_date, format::parse_date("2023-10-10").ok());
    }

    #[tokio::test]
    async fn malformed_date_is_kept_raw() {
        let service = service_with(vec![BillDocument {
            id: "1".to_string(),
            record: bill("employee@test.tld", "not-a-date", "pending"),
        }]);

        let bills = service.get_bills("employee@test.tld").await.unwrap();
        assert_eq!(bills[0].date, "not-a-date");
        assert_eq!(bills[0].status, "Pending");
        assert_eq!(bills[0].sort_date, None);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let service = BillsService::new(Some(Arc::new(FakeStore {
            docs: Vec::new(),
            fail: true,
        })));

        let result = service.get_bills("employee@test.tld").await;
        assert!(matches!(result, Err(StoreError::Status(_))));
    }

    #[tokio::test]
    async fn orders_latest_first_with_unparseable_dates_last() {
        let service = service_with(vec![
            BillDocument {
                id: "old".to_string(),
                record: bill("employee@test.tld", "2022-01-01", "pending"),
            },
            BillDocument {
                id: "broken".to_string(),
                record: bill("employee@test.tld", "garbage", "pending"),
            },
            BillDocument {
                id: "new".to_string(),
                record: bill("employee@test.tld", "2023-10-10", "pending"),
            },
        ]);

        let mut bills = service.get_bills("employee@test.tld").await.unwrap();
        order_latest_first(&mut bills);

        let ids: Vec<&str> = bills.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "broken"]);
    }
}
