//! Demo Data
//!
//! Small seed set so the dashboard has something to page through.

use serde_json::{json, Value};

use crate::client::{EntityKind, FieldDescriptor, Record};

pub fn fields(kind: EntityKind) -> Vec<FieldDescriptor> {
    let pairs: &[(&str, &str)] = match kind {
        EntityKind::Contacts => &[
            ("firstname", "First Name"),
            ("lastname", "Last Name"),
            ("email", "Email"),
            ("phone", "Phone Number"),
            ("company", "Company Name"),
            ("lifecyclestage", "Lifecycle Stage"),
        ],
        EntityKind::Companies => &[
            ("name", "Company Name"),
            ("domain", "Company Domain Name"),
            ("industry", "Industry"),
            ("city", "City"),
            ("numberofemployees", "Number of Employees"),
        ],
        EntityKind::Deals => &[
            ("dealname", "Deal Name"),
            ("amount", "Amount"),
            ("dealstage", "Deal Stage"),
            ("pipeline", "Pipeline"),
            ("closedate", "Close Date"),
        ],
        EntityKind::Products => &[
            ("name", "Name"),
            ("price", "Unit Price"),
            ("hs_sku", "SKU"),
            ("description", "Description"),
        ],
        EntityKind::Quotes => &[
            ("hs_title", "Quote Name"),
            ("hs_status", "Quote Status"),
            ("hs_expiration_date", "Expiration Date"),
        ],
        EntityKind::Payments => &[
            ("hs_amount", "Amount"),
            ("hs_currency_code", "Currency"),
            ("hs_status", "Status"),
        ],
        EntityKind::Invoices => &[
            ("hs_number", "Invoice Number"),
            ("hs_amount_billed", "Amount Billed"),
            ("hs_due_date", "Due Date"),
        ],
        EntityKind::Subscriptions => &[
            ("hs_name", "Subscription Name"),
            ("hs_recurring_billing_period", "Billing Period"),
            ("hs_status", "Status"),
        ],
    };

    pairs
        .iter()
        .map(|(key, label)| FieldDescriptor::new(*key, *label))
        .collect()
}

pub fn records(kind: EntityKind) -> Vec<Record> {
    let values = match kind {
        EntityKind::Contacts => vec![
            json!({"id": "101", "firstname": "John", "lastname": "Doe", "email": "john@example.com", "phone": "+1 555 0100", "company": "Acme Corp", "lifecyclestage": "customer"}),
            json!({"id": "102", "firstname": "Jane", "lastname": "Roe", "email": "jane@globex.com", "phone": "+1 555 0101", "company": "Globex", "lifecyclestage": "lead"}),
            json!({"id": "103", "firstname": "Johnny", "lastname": "Appleseed", "email": "johnny@orchard.io", "phone": null, "company": "Orchard", "lifecyclestage": "opportunity"}),
            json!({"id": "104", "firstname": "Ada", "lastname": "Lovelace", "email": "ada@engines.co.uk", "phone": "+44 20 7946 0000", "company": "Analytical Engines", "lifecyclestage": "customer"}),
            json!({"id": "105", "firstname": "Grace", "lastname": "Hopper", "email": "grace@navy.mil", "phone": null, "company": "Navy", "lifecyclestage": "subscriber"}),
        ],
        EntityKind::Companies => vec![
            json!({"id": "201", "name": "Acme Corp", "domain": "acme.com", "industry": "Manufacturing", "city": "Springfield", "numberofemployees": 250}),
            json!({"id": "202", "name": "Globex", "domain": "globex.com", "industry": "Energy", "city": "Cypress Creek", "numberofemployees": 1200}),
            json!({"id": "203", "name": "Orchard", "domain": "orchard.io", "industry": "Agriculture", "city": "Portland", "numberofemployees": 18}),
        ],
        EntityKind::Deals => vec![
            json!({"id": "301", "dealname": "Acme renewal", "amount": "12000", "dealstage": "closedwon", "pipeline": "default", "closedate": "2024-02-01"}),
            json!({"id": "302", "dealname": "Globex expansion", "amount": "48000", "dealstage": "contractsent", "pipeline": "default", "closedate": "2024-05-15"}),
            json!({"id": "303", "dealname": "Orchard pilot", "amount": "3500", "dealstage": "appointmentscheduled", "pipeline": "default", "closedate": null}),
        ],
        EntityKind::Products => vec![
            json!({"id": "401", "name": "Starter plan", "price": "49.00", "hs_sku": "PLAN-S", "description": "Up to 5 seats"}),
            json!({"id": "402", "name": "Growth plan", "price": "199.00", "hs_sku": "PLAN-G", "description": "Up to 50 seats"}),
        ],
        EntityKind::Quotes => vec![
            json!({"id": "501", "hs_title": "Globex expansion quote", "hs_status": "APPROVED", "hs_expiration_date": "2024-06-01"}),
        ],
        EntityKind::Payments => vec![
            json!({"id": "601", "hs_amount": "12000", "hs_currency_code": "USD", "hs_status": "succeeded"}),
        ],
        EntityKind::Invoices => vec![
            json!({"id": "701", "hs_number": "INV-0001", "hs_amount_billed": "12000", "hs_due_date": "2024-03-01"}),
        ],
        EntityKind::Subscriptions => vec![
            json!({"id": "801", "hs_name": "Acme Growth", "hs_recurring_billing_period": "P1M", "hs_status": "active"}),
        ],
    };

    values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_seeded() {
        for kind in EntityKind::ALL {
            assert!(!fields(kind).is_empty(), "{} has no fields", kind);
            assert!(!records(kind).is_empty(), "{} has no records", kind);
        }
    }

    #[test]
    fn test_records_only_use_known_fields() {
        for kind in EntityKind::ALL {
            let keys: Vec<String> = fields(kind).into_iter().map(|f| f.field_key).collect();
            for record in records(kind) {
                for key in record.keys().filter(|k| k.as_str() != "id") {
                    assert!(keys.contains(key), "{}: unexpected key {}", kind, key);
                }
            }
        }
    }
}
