use super::*;

#[test]
fn channel_coordinator_coalesces_waiting_requests() {
    let (coord, rx) = ChannelCoordinator::new();
    for _ in 0..100 {
        coord.request_switch(SwitchReason::Update);
    }
    let got: Vec<_> = rx.try_iter().collect();
    assert_eq!(got, vec![SwitchReason::Update]);

    coord.request_switch(SwitchReason::Update);
    assert_eq!(rx.try_recv(), Ok(SwitchReason::Update));
}

#[test]
fn channel_coordinator_survives_dropped_receiver() {
    let (coord, rx) = ChannelCoordinator::new();
    drop(rx);
    coord.request_switch(SwitchReason::Update);
}

#[test]
fn static_settings_deserialize_with_defaults() {
    let s: StaticSettings = serde_json::from_str("{}").unwrap();
    assert!(!s.timing_inaccuracies_enabled());
    let s: StaticSettings = serde_json::from_str(r#"{"timing_inaccuracies":true}"#).unwrap();
    assert!(s.timing_inaccuracies_enabled());
}

#[test]
fn detached_services_do_not_tolerate_inaccuracies() {
    let h = HostServices::detached();
    assert!(!h.settings.timing_inaccuracies_enabled());
    let h = h.with_settings(StaticSettings {
        timing_inaccuracies: true,
    });
    assert!(h.settings.timing_inaccuracies_enabled());
}
