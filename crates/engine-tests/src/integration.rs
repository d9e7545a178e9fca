#[cfg(test)]
mod tests {
    use crate::{
        Harness,
        utils::{
            GROUPS, TICKET_FIELDS, TICKETS, agent_group, mount_helpdesk, mount_missing_table,
            mount_pages, mount_status, mount_warehouse_down, mount_watermark, parse_csv,
            query_value, ticket, ticket_field, tickets,
        },
    };
    use engine_runtime::{
        error::RunError,
        report::{PipelineStage, ResourceOutcome},
    };
    use model::resource::ResourceKind;
    use serde_json::{Value, json};
    use tracing_test::traced_test;
    use wiremock::{
        Mock, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    const MARK: &str = "2024-03-01T00:00:00Z";
    const FRESH: &str = "2024-03-05T10:00:00Z";

    fn delivered_rows(outcome: &ResourceOutcome) -> usize {
        match outcome {
            ResourceOutcome::Delivered { rows, .. } => *rows,
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    // Scenario: 137 tickets changed since the watermark, served over two pages.
    // Expected Outcome: two ticket requests bounded by the watermark and a
    // TICKETS.csv with a header plus 137 rows.
    #[traced_test]
    #[tokio::test]
    async fn tc01_incremental_tickets_over_two_pages() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;
        mount_helpdesk(
            &h,
            &tickets(137, FRESH),
            &[ticket_field(1), ticket_field(2)],
            &[agent_group(1)],
        )
        .await;

        let report = h.run().await;

        assert!(report.succeeded());
        assert_eq!(report.watermark.map(|w| w.to_string()).as_deref(), Some(MARK));

        let requests = h.helpdesk_requests(TICKETS).await;
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(query_value(request, "updated_since").as_deref(), Some(MARK));
            assert_eq!(query_value(request, "per_page").as_deref(), Some("100"));
        }

        let csv = h.stage_text("TICKETS.csv").await;
        assert_eq!(csv.lines().count(), 138);
        assert!(csv.starts_with("ID,"));

        let tickets = report.resource(ResourceKind::Tickets).unwrap();
        assert_eq!(tickets.pages, 2);
        assert_eq!(delivered_rows(&tickets.outcome), 137);
        assert_eq!(report.metrics.records_fetched, 140);
    }

    // Scenario: the agent groups endpoint rejects the credentials.
    // Expected Outcome: tickets and ticket fields are still delivered, agent
    // groups fail at the fetch stage and the run is reported as failed.
    #[traced_test]
    #[tokio::test]
    async fn tc02_auth_failure_on_one_resource() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;
        mount_status(&h, GROUPS, 401).await;
        mount_helpdesk(&h, &tickets(3, FRESH), &[ticket_field(1)], &[]).await;

        let report = h.run().await;

        assert!(!report.succeeded());
        let groups = report.resource(ResourceKind::AgentGroups).unwrap();
        match &groups.outcome {
            ResourceOutcome::Failed { stage, error } => {
                assert_eq!(*stage, PipelineStage::Fetch);
                assert!(error.contains("401"), "{error}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(h.helpdesk_requests(GROUPS).await.len(), 1);

        assert_eq!(h.stage_names().await, vec!["TICKETS.csv", "TICKET_FIELDS.csv"]);
        assert!(logs_contain("Resource failed"));
    }

    // Scenario: the destination table exists but is empty.
    // Expected Outcome: no watermark; tickets are requested from the full
    // extract date and nothing is filtered out.
    #[tokio::test]
    async fn tc03_empty_destination_extracts_everything() {
        let h = Harness::start().await;
        mount_watermark(&h, None).await;
        let mut all = tickets(4, FRESH);
        all.push(ticket(5, "2019-07-01T00:00:00Z"));
        mount_helpdesk(&h, &all, &[], &[]).await;

        let report = h.run().await;

        assert!(report.succeeded());
        assert_eq!(report.watermark, None);
        let request = &h.helpdesk_requests(TICKETS).await[0];
        assert_eq!(
            query_value(request, "updated_since").as_deref(),
            Some("2001-04-16T00:00:00Z")
        );
        assert_eq!(
            delivered_rows(&report.resource(ResourceKind::Tickets).unwrap().outcome),
            5
        );
    }

    // Scenario: the destination table does not exist yet (SQL compilation error).
    // Expected Outcome: a warning is logged and the run falls back to a full extract.
    #[traced_test]
    #[tokio::test]
    async fn tc04_missing_destination_table_is_not_fatal() {
        let h = Harness::start().await;
        mount_missing_table(&h).await;
        mount_helpdesk(&h, &tickets(2, FRESH), &[], &[]).await;

        let report = h.run().await;

        assert!(report.succeeded());
        assert_eq!(report.watermark, None);
        assert!(logs_contain("not queryable"));
    }

    // Scenario: the warehouse is unreachable.
    // Expected Outcome: the run aborts before any helpdesk request.
    #[tokio::test]
    async fn tc05_warehouse_outage_aborts_the_run() {
        let h = Harness::start().await;
        mount_warehouse_down(&h).await;
        mount_helpdesk(&h, &tickets(2, FRESH), &[], &[]).await;

        let err = h.try_run().await.unwrap_err();

        assert!(matches!(err, RunError::Watermark(_)));
        assert!(h.helpdesk.received_requests().await.unwrap_or_default().is_empty());
        assert!(h.stage_names().await.is_empty());
    }

    // Scenario: the same data is extracted twice.
    // Expected Outcome: the staged files are byte-identical.
    #[tokio::test]
    async fn tc06_rerun_is_byte_identical() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;
        mount_helpdesk(
            &h,
            &tickets(12, FRESH),
            &[ticket_field(1), ticket_field(2)],
            &[agent_group(1), agent_group(2)],
        )
        .await;

        h.run().await;
        let mut first = Vec::new();
        for name in h.stage_names().await {
            first.push((name.clone(), h.stage_text(&name).await));
        }

        h.run().await;
        let mut second = Vec::new();
        for name in h.stage_names().await {
            second.push((name.clone(), h.stage_text(&name).await));
        }

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    // Scenario: record counts around the page size boundary.
    // Expected Outcome: ceil(R / P) requests, and one request when R = 0.
    #[tokio::test]
    async fn tc07_request_count_follows_page_size() {
        for (count, expected) in [(0u64, 1usize), (10, 1), (25, 3)] {
            let h = Harness::start_with(&[("PAGE_SIZE", "10")]).await;
            mount_watermark(&h, None).await;
            mount_pages(&h, TICKETS, &[], 10).await;
            mount_pages(&h, TICKET_FIELDS, &[], 10).await;
            let groups: Vec<Value> = (1..=count).map(agent_group).collect();
            mount_pages(&h, GROUPS, &groups, 10).await;

            let report = h.run().await;

            assert_eq!(h.helpdesk_requests(GROUPS).await.len(), expected, "R = {count}");
            assert_eq!(
                delivered_rows(&report.resource(ResourceKind::AgentGroups).unwrap().outcome),
                count as usize
            );
        }
    }

    // Scenario: tickets carry different custom fields.
    // Expected Outcome: every row has as many cells as the header, custom
    // fields lose their namespace prefix and arrays are staged as JSON.
    #[tokio::test]
    async fn tc08_rows_share_one_layout() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;

        let mut varied = tickets(3, FRESH);
        varied[1]["custom_fields"]["cost_center"] = json!("CC-1");
        varied[2]["custom_fields"] = Value::Null;
        mount_helpdesk(&h, &varied, &[ticket_field(1)], &[agent_group(1)]).await;

        h.run().await;

        for name in ["TICKETS.csv", "TICKET_FIELDS.csv", "AGENTGROUPS.csv"] {
            let (header, rows) = parse_csv(&h.stage_text(name).await);
            assert!(rows.iter().all(|r| r.len() == header.len()), "{name}");
        }

        let (header, rows) = parse_csv(&h.stage_text("TICKETS.csv").await);
        assert!(header.contains(&"REGION".to_string()));
        assert!(header.contains(&"COST_CENTER".to_string()));
        assert!(!header.iter().any(|c| c.starts_with("CUSTOM_FIELDS")));

        let cc = header.iter().position(|c| c == "CC_EMAILS").unwrap();
        assert_eq!(rows[0][cc], r#"["ops@example.com"]"#);
        let cost = header.iter().position(|c| c == "COST_CENTER").unwrap();
        assert_eq!(rows[0][cost], "");
        assert_eq!(rows[1][cost], "CC-1");
    }

    // Scenario: one ticket has no identifier.
    // Expected Outcome: tickets fail at normalization and are not uploaded;
    // the previous TICKETS.csv stays untouched and the other resources load.
    #[tokio::test]
    async fn tc09_missing_identifier_fails_the_resource() {
        let h = Harness::start().await;
        h.stage_put("TICKETS.csv", "ID\n1\n").await;
        mount_watermark(&h, Some(MARK)).await;

        let mut broken = tickets(3, FRESH);
        broken[1].as_object_mut().unwrap().remove("id");
        mount_helpdesk(&h, &broken, &[ticket_field(1)], &[agent_group(1)]).await;

        let report = h.run().await;

        let outcome = &report.resource(ResourceKind::Tickets).unwrap().outcome;
        assert!(matches!(
            outcome,
            ResourceOutcome::Failed {
                stage: PipelineStage::Normalize,
                ..
            }
        ));
        assert_eq!(h.stage_text("TICKETS.csv").await, "ID\n1\n");
        assert!(report.resource(ResourceKind::TicketFields).unwrap().is_delivered());
        assert!(report.resource(ResourceKind::AgentGroups).unwrap().is_delivered());
    }

    // Scenario: the ticket extract exceeds the stage file size limit.
    // Expected Outcome: numbered parts, each with the header, holding every
    // ticket exactly once and in order.
    #[tokio::test]
    async fn tc10_large_extract_is_split() {
        let h = Harness::start_with(&[("STAGE_MAX_FILE_BYTES", "4096")]).await;
        mount_watermark(&h, Some(MARK)).await;
        mount_helpdesk(&h, &tickets(137, FRESH), &[], &[]).await;

        let report = h.run().await;

        let parts: Vec<String> = h
            .stage_names()
            .await
            .into_iter()
            .filter(|n| n.starts_with("TICKETS_part_"))
            .collect();
        assert!(parts.len() > 1);
        assert_eq!(parts[0], "TICKETS_part_0001.csv");
        match &report.resource(ResourceKind::Tickets).unwrap().outcome {
            ResourceOutcome::Delivered { files, rows, .. } => {
                assert_eq!(*files, parts.len());
                assert_eq!(*rows, 137);
            }
            other => panic!("expected delivery, got {other:?}"),
        }

        let mut expected_header = None;
        let mut ids = Vec::new();
        for part in &parts {
            let text = h.stage_text(part).await;
            assert!(text.len() <= 4096, "{part} is {} bytes", text.len());
            let (header, rows) = parse_csv(&text);
            match &expected_header {
                None => expected_header = Some(header),
                Some(first) => assert_eq!(first, &header),
            }
            ids.extend(rows.into_iter().map(|r| r[0].parse::<u64>().unwrap()));
        }
        assert_eq!(ids, (1..=137).collect::<Vec<_>>());
    }

    // Scenario: a previous run left more parts than this run writes.
    // Expected Outcome: the stale parts are removed, other resources' objects stay.
    #[tokio::test]
    async fn tc11_stale_parts_are_removed() {
        let h = Harness::start().await;
        for name in [
            "TICKETS_part_0001.csv",
            "TICKETS_part_0002.csv",
            "TICKETS_part_0003.csv",
            "AGENTGROUPS_part_0001.csv",
            "README.txt",
        ] {
            h.stage_put(name, "old\n").await;
        }
        mount_watermark(&h, Some(MARK)).await;
        mount_helpdesk(&h, &tickets(2, FRESH), &[ticket_field(1)], &[agent_group(1)]).await;

        h.run().await;

        assert_eq!(
            h.stage_names().await,
            vec![
                "AGENTGROUPS.csv",
                "README.txt",
                "TICKETS.csv",
                "TICKET_FIELDS.csv"
            ]
        );
    }

    // Scenario: the helpdesk rate-limits the first ticket request.
    // Expected Outcome: the same page is requested again after Retry-After
    // and the run succeeds.
    #[traced_test]
    #[tokio::test]
    async fn tc12_rate_limit_is_retried() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/tickets"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&h.helpdesk)
            .await;
        mount_helpdesk(&h, &tickets(5, FRESH), &[], &[]).await;

        let report = h.run().await;

        assert!(report.succeeded());
        let pages: Vec<Option<String>> = h
            .helpdesk_requests(TICKETS)
            .await
            .iter()
            .map(|r| query_value(r, "page"))
            .collect();
        assert_eq!(pages, vec![Some("1".to_string()), Some("1".to_string())]);
        assert_eq!(report.metrics.retry_count, 1);
        assert!(logs_contain("retrying"));
    }

    // Scenario: the API returns a ticket older than the watermark.
    // Expected Outcome: it is dropped; only tickets at or after the watermark are staged.
    #[tokio::test]
    async fn tc13_tickets_older_than_watermark_are_dropped() {
        let h = Harness::start().await;
        mount_watermark(&h, Some(MARK)).await;
        let mut served = tickets(3, FRESH);
        served.push(ticket(4, "2024-02-01T00:00:00Z"));
        served.push(ticket(5, MARK));
        mount_helpdesk(&h, &served, &[], &[]).await;

        let report = h.run().await;

        let (header, rows) = parse_csv(&h.stage_text("TICKETS.csv").await);
        assert_eq!(header[0], "ID");
        let ids: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "5"]);
        assert_eq!(report.resource(ResourceKind::Tickets).unwrap().records, 4);
    }
}
