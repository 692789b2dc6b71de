use super::*;

#[test]
fn queue_name_round_trips_through_display_and_from_str() {
    for q in QueueName::PRIORITY_ORDER {
        let parsed: QueueName = q.as_str().parse().unwrap();
        assert_eq!(parsed, q);
    }
    assert_eq!("scheduled_jobs".parse::<QueueName>().unwrap(), QueueName::ScheduledJobs);
}

#[test]
fn unknown_queue_name_fails_to_parse() {
    assert!("not_a_queue".parse::<QueueName>().is_err());
}

#[test]
fn priority_order_matches_spec() {
    assert_eq!(
        QueueName::PRIORITY_ORDER,
        [
            QueueName::FlightSearch,
            QueueName::BulkSearch,
            QueueName::BulkSearchRoute,
            QueueName::PriceGraphSweep,
            QueueName::ContinuousPriceGraph,
        ]
    );
}

#[test]
fn only_sweep_queues_are_gated_by_bulk_backpressure() {
    assert!(!QueueName::FlightSearch.gated_by_bulk_backpressure());
    assert!(!QueueName::BulkSearch.gated_by_bulk_backpressure());
    assert!(!QueueName::BulkSearchRoute.gated_by_bulk_backpressure());
    assert!(QueueName::PriceGraphSweep.gated_by_bulk_backpressure());
    assert!(QueueName::ContinuousPriceGraph.gated_by_bulk_backpressure());
}

#[test]
fn payload_as_deserializes_json_payload() {
    #[derive(Deserialize)]
    struct Payload {
        origin: String,
    }

    let job = Job {
        id: JobId::new("job-1"),
        queue: QueueName::BulkSearchRoute,
        job_type: JobType::BulkSearchRoute,
        payload: serde_json::to_vec(&serde_json::json!({"origin": "JFK"})).unwrap(),
        meta: EnqueueMeta::for_actor("tester"),
        attempts: 0,
        enqueued_at: Utc::now(),
    };

    let payload: Payload = job.payload_as().unwrap();
    assert_eq!(payload.origin, "JFK");
}
