#![allow(dead_code)]

use crate::Harness;
use model::watermark::Watermark;
use serde_json::{Value, json};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

pub const TICKETS: &str = "tickets";
pub const TICKET_FIELDS: &str = "ticket_form_fields";
pub const GROUPS: &str = "groups";

/// A ticket as the helpdesk returns it, with one custom field.
pub fn ticket(id: u64, updated_at: &str) -> Value {
    let region = if id % 2 == 0 { "EU" } else { "US" };
    json!({
        "id": id,
        "subject": format!("Ticket {id}"),
        "description_text": "Printer on fire, \"again\"",
        "status": 2,
        "priority": 1,
        "group_id": 7,
        "cc_emails": ["ops@example.com"],
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": updated_at,
        "custom_fields": {"region": region}
    })
}

pub fn tickets(count: u64, updated_at: &str) -> Vec<Value> {
    (1..=count).map(|id| ticket(id, updated_at)).collect()
}

pub fn ticket_field(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("field_{id}"),
        "label": format!("Field {id}"),
        "field_type": "custom_dropdown",
        "required": false,
        "choices": [["a", "1"], ["b", "2"]],
        "created_at": "2023-06-01T00:00:00Z",
        "updated_at": "2023-06-02T00:00:00Z"
    })
}

pub fn agent_group(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Group {id}"),
        "restricted": false,
        "members": [1, 2, 3],
        "created_at": "2022-01-01T00:00:00Z",
        "updated_at": "2022-01-01T00:00:00Z"
    })
}

/// Envelope key for an endpoint.
fn envelope(endpoint: &str) -> &'static str {
    match endpoint {
        TICKETS => "tickets",
        TICKET_FIELDS => "ticket_fields",
        _ => "groups",
    }
}

/// Serves `records` from `endpoint` in pages of `per_page`, advertising a
/// next link on every page but the last.
pub async fn mount_pages(h: &Harness, endpoint: &str, records: &[Value], per_page: usize) {
    let pages: Vec<&[Value]> = if records.is_empty() {
        vec![records]
    } else {
        records.chunks(per_page).collect()
    };
    let last = pages.len();

    for (i, chunk) in pages.into_iter().enumerate() {
        let page = i + 1;
        let mut body = serde_json::Map::new();
        body.insert(envelope(endpoint).to_string(), json!(chunk));
        let mut response = ResponseTemplate::new(200).set_body_json(Value::Object(body));
        if page < last {
            response = response.insert_header(
                "Link",
                format!(
                    "<{}/api/v2/{endpoint}?page={}&per_page={per_page}>; rel=\"next\"",
                    h.helpdesk.uri(),
                    page + 1
                ),
            );
        }

        Mock::given(method("GET"))
            .and(path(format!("/api/v2/{endpoint}")))
            .and(query_param("page", page.to_string()))
            .respond_with(response)
            .mount(&h.helpdesk)
            .await;
    }
}

/// Mounts the three endpoints with the given data and a page size of 100.
pub async fn mount_helpdesk(h: &Harness, tickets: &[Value], fields: &[Value], groups: &[Value]) {
    mount_pages(h, TICKETS, tickets, 100).await;
    mount_pages(h, TICKET_FIELDS, fields, 100).await;
    mount_pages(h, GROUPS, groups, 100).await;
}

pub async fn mount_status(h: &Harness, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/{endpoint}")))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"code\":\"denied\"}"))
        .with_priority(1)
        .mount(&h.helpdesk)
        .await;
}

/// The watermark statement answers with one cell: the epoch seconds of
/// `value`, as Snowflake returns them.
pub async fn mount_watermark(h: &Harness, value: Option<&str>) {
    let value = value.map(|ts| {
        let mark: Watermark = ts.parse().expect("fixture timestamp");
        mark.timestamp().timestamp().to_string()
    });
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_string_contains("EPOCH_SECOND"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statementHandle": "01b2c3",
            "data": [[value]]
        })))
        .mount(&h.snowflake)
        .await;
}

/// The destination table does not exist yet.
pub async fn mount_missing_table(h: &Harness) {
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "002003",
            "message": "SQL compilation error:\nObject 'RAW.FRESHSERVICE.TICKETS' does not exist or not authorized.",
            "sqlState": "42S02",
            "statementHandle": "01b2c4"
        })))
        .mount(&h.snowflake)
        .await;
}

pub async fn mount_warehouse_down(h: &Harness) {
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.snowflake)
        .await;
}

/// Parses a staged CSV document into its header and rows.
pub fn parse_csv(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let header = reader
        .headers()
        .expect("csv header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("csv row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

pub fn query_value(request: &wiremock::Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
