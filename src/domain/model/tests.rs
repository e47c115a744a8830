// Unit tests for domain models

use super::*;

fn text_request(text: &str) -> OverlayRequest {
    OverlayRequest {
        kind: "text".to_string(),
        start_time: 1.0,
        end_time: 5.0,
        x: 50.0,
        y: 90.0,
        font_size: Some(32),
        font_color: Some("yellow".to_string()),
        background_color: None,
        timer_type: None,
        timer_format: None,
        text: Some(text.to_string()),
    }
}

fn timer(timer_type: TimerType, timer_format: TimerFormat, start: f64, end: f64) -> TimerOverlay {
    TimerOverlay {
        label: "REST".to_string(),
        timer_type,
        timer_format,
        window: TimeWindow::new(start, end).unwrap(),
        position: Position::new(10.0, 10.0).unwrap(),
        style: TextStyle::default(),
    }
}

#[test]
fn test_overlay_request_deserializes_camel_case() {
    let json = r#"{
        "type": "timer",
        "startTime": 10,
        "endTime": 70,
        "x": 20,
        "y": 30,
        "fontSize": 28,
        "timerType": "countdown",
        "timerFormat": "seconds",
        "text": "Plank"
    }"#;
    let request: OverlayRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.kind, "timer");
    assert_eq!(request.font_size, Some(28));

    let spec = OverlaySpec::try_from(request).unwrap();
    match spec {
        OverlaySpec::Timer(timer) => {
            assert_eq!(timer.label, "Plank");
            assert_eq!(timer.timer_type, TimerType::Countdown);
            assert_eq!(timer.timer_format, TimerFormat::Seconds);
            assert_eq!(timer.style.font_size, 28);
        }
        other => panic!("expected timer, got {:?}", other),
    }
}

#[test]
fn test_text_overlay_applies_style_defaults() {
    let spec = OverlaySpec::try_from(text_request("Squat")).unwrap();
    assert_eq!(spec.style().font_color, "yellow");
    assert_eq!(spec.style().background_color, DEFAULT_BACKGROUND_COLOR);
    assert!(!spec.is_timer());
}

#[test]
fn test_unknown_overlay_kind_is_rejected() {
    let mut request = text_request("hello");
    request.kind = "sticker".to_string();
    assert!(matches!(
        OverlaySpec::try_from(request),
        Err(DomainError::UnknownOverlayKind(_))
    ));
}

#[test]
fn test_unknown_timer_type_is_rejected() {
    let mut request = text_request("");
    request.kind = "timer".to_string();
    request.timer_type = Some("stopwatch".to_string());
    assert!(matches!(
        OverlaySpec::try_from(request),
        Err(DomainError::UnknownOverlayKind(_))
    ));
}

#[test]
fn test_invalid_window_and_position_are_rejected() {
    let mut request = text_request("hello");
    request.end_time = request.start_time;
    assert!(matches!(
        OverlaySpec::try_from(request),
        Err(DomainError::InvalidTimeRange(_))
    ));

    let mut request = text_request("hello");
    request.x = 120.0;
    assert!(OverlaySpec::try_from(request).is_err());
}

#[test]
fn test_color_with_graph_syntax_is_rejected() {
    let mut request = text_request("hello");
    request.font_color = Some("red:fontsize=999".to_string());
    assert!(matches!(
        OverlaySpec::try_from(request),
        Err(DomainError::ValidationFailed(_))
    ));

    let mut request = text_request("hello");
    request.background_color = Some("#202020@0.6".to_string());
    assert!(OverlaySpec::try_from(request).is_ok());
}

#[test]
fn test_parse_overlays_keeps_order_and_reports_index() {
    let overlays = parse_overlays(vec![text_request("first"), text_request("second")]).unwrap();
    match (&overlays[0], &overlays[1]) {
        (OverlaySpec::Text(a), OverlaySpec::Text(b)) => {
            assert_eq!(a.text, "first");
            assert_eq!(b.text, "second");
        }
        _ => panic!("expected two text overlays"),
    }

    let mut bad = text_request("bad");
    bad.kind = "gif".to_string();
    let err = parse_overlays(vec![text_request("ok"), bad]).unwrap_err();
    assert!(err.to_string().contains("overlay #1"));

    assert!(parse_overlays(Vec::new()).is_err());
}

#[test]
fn test_elapsed_minutes_seconds_display() {
    let timer = timer(TimerType::Elapsed, TimerFormat::MinutesSeconds, 10.0, 70.0);
    assert_eq!(timer.display_at(40.0), "00:30");
    assert_eq!(timer.display_at(10.0), "00:00");
    assert_eq!(timer.display_at(69.9), "00:59");
}

#[test]
fn test_countdown_seconds_display() {
    let timer = timer(TimerType::Countdown, TimerFormat::Seconds, 0.0, 60.0);
    assert_eq!(timer.display_at(55.0), "5");
    assert_eq!(timer.display_at(0.0), "60");
}

#[test]
fn test_countdown_minutes_seconds_display() {
    let timer = timer(TimerType::Countdown, TimerFormat::MinutesSeconds, 0.0, 125.0);
    assert_eq!(timer.display_at(0.0), "02:05");
    assert_eq!(timer.display_at(130.0), "00:00");
}

#[test]
fn test_hardware_capability_serialization() {
    let json = serde_json::to_value(HardwareCapability::software()).unwrap();
    assert_eq!(json, serde_json::json!({"type": "none", "available": false}));

    let gpu = HardwareCapability::hardware(HardwareKind::DedicatedGpu);
    assert!(gpu.available);
    assert_eq!(gpu.kind.to_string(), "dedicated-gpu");
    assert!(HardwareKind::PlatformGpu.requires_nv12());
    assert!(!HardwareKind::DedicatedGpu.requires_nv12());
}
