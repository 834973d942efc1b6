//! Service facade integration tests.

use trial_ops_core::{AppointmentRequest, DispenseRequest, TrialOpsCore, TrialOpsError};

fn request(patient_id: &str, start_at: &str, duration_minutes: i64) -> AppointmentRequest {
    AppointmentRequest {
        patient_id: patient_id.to_string(),
        title: "Screening".into(),
        start_at: start_at.to_string(),
        duration_minutes,
        ..Default::default()
    }
}

#[test]
fn conflict_maps_to_conflict_error() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let patient = core
        .create_patient("Ada".into(), "Osei".into(), None, None)
        .unwrap();

    core.schedule_appointment(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
        .unwrap();

    let result = core.schedule_appointment(&request(&patient.id, "2026-03-01T09:15:00Z", 30));
    assert!(matches!(result, Err(TrialOpsError::Conflict(_))));
}

#[test]
fn mutations_leave_an_audit_trail() {
    let mut core = TrialOpsCore::open_in_memory().unwrap();
    core.set_default_actor("coordinator@site-12");

    let patient = core
        .create_patient("Ada".into(), "Osei".into(), None, None)
        .unwrap();
    let item = core
        .create_inventory_item("Kit A".into(), None, None)
        .unwrap();
    let lot = core
        .create_inventory_lot(&item.id, None, 10, None)
        .unwrap();
    core.dispense(&DispenseRequest {
        patient_id: patient.id.clone(),
        item_id: item.id.clone(),
        lot_id: lot.id.clone(),
        quantity: 2,
    })
    .unwrap();

    let entries = core.recent_audit(10).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.actor.as_deref() == Some("coordinator@site-12")));

    // Newest first: the dispense leads
    assert_eq!(entries[0].action, "dispense");
    assert_eq!(entries[0].entity, "lot");
    assert_eq!(entries[0].entity_id, Some(lot.id.clone()));
}

#[test]
fn failed_operations_are_not_audited() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let patient = core
        .create_patient("Ada".into(), "Osei".into(), None, None)
        .unwrap();

    core.schedule_appointment(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
        .unwrap();
    let before = core.recent_audit(50).unwrap().len();

    let _ = core.schedule_appointment(&request(&patient.id, "2026-03-01T09:15:00Z", 30));
    assert_eq!(core.recent_audit(50).unwrap().len(), before);
}

#[test]
fn cancel_then_rebook_same_slot() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let patient = core
        .create_patient("Ada".into(), "Osei".into(), None, None)
        .unwrap();

    let appt = core
        .schedule_appointment(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
        .unwrap();
    assert!(core.cancel_appointment(&appt.id).unwrap());

    // The slot is free again
    core.schedule_appointment(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
        .unwrap();
}

#[test]
fn out_of_window_visit_is_accepted() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let patient = core
        .create_patient(
            "Ada".into(),
            "Osei".into(),
            None,
            Some("2026-02-01".into()),
        )
        .unwrap();
    let week4 = core
        .create_visit_type("Week 4".into(), 28, 3, 3, 30)
        .unwrap();

    // Window is 2026-02-26 .. 2026-03-04; far outside it, still accepted
    let mut req = request(&patient.id, "2026-04-15T09:00:00Z", 30);
    req.visit_type_id = Some(week4.id.clone());
    let appt = core.schedule_appointment(&req).unwrap();
    assert_eq!(appt.visit_type_id, Some(week4.id));
}

#[test]
fn report_flows_through_facade() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let item = core
        .create_inventory_item("Kit A".into(), Some("kits".into()), None)
        .unwrap();
    core.create_inventory_lot(&item.id, Some("LOT-1".into()), 3, None)
        .unwrap();

    let report = core.inventory_report().unwrap();
    assert_eq!(report.rows.len(), 1);

    let csv = core.inventory_report_csv().unwrap();
    assert!(csv.contains("Kit A"));

    let low = core.low_stock_alerts().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].quantity, 3);
}

#[test]
fn basic_inventory_round_trip() {
    let core = TrialOpsCore::open_in_memory().unwrap();

    core.create_basic_inventory("Syringe 5mL", Some("Luer lock"), "CARDIO-1", "NCT0001", 200)
        .unwrap();

    let rows = core.list_basic_inventory().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_name, "Syringe 5mL");

    let missing_name = core.create_basic_inventory("", None, "CARDIO-1", "NCT0001", 1);
    assert!(matches!(missing_name, Err(TrialOpsError::Validation(_))));
}

#[test]
fn lot_creation_validates_inputs() {
    let core = TrialOpsCore::open_in_memory().unwrap();
    let item = core
        .create_inventory_item("Kit A".into(), None, None)
        .unwrap();

    let negative = core.create_inventory_lot(&item.id, None, -1, None);
    assert!(matches!(negative, Err(TrialOpsError::Validation(_))));

    let orphan = core.create_inventory_lot("no-such-item", None, 5, None);
    assert!(matches!(orphan, Err(TrialOpsError::NotFound(_))));
}
