#[cfg(test)]
mod telemetry_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crypto_accel::crypto::{AesKeySize, DigestAccumulator, DigestAlg, GcmSession};
    use crypto_accel::primitive::{Direction, SoftAccelerator};
    use crypto_accel::telemetry::{SessionCounters, Stage, StageTimes};

    fn make_counters() -> SessionCounters {
        SessionCounters {
            primitive_calls: 10,
            primitive_failures: 1,
            blocks_submitted: 4,
            bytes_hashed: 300,
            aad_bytes: 13,
            payload_bytes: 64,
            messages_finalized: 2,
            records_sealed: 1,
            records_opened: 0,
            auth_failures: 1,
        }
    }

    #[test]
    fn add_call_counts_failures_separately() {
        let mut c = SessionCounters::default();
        c.add_call(true);
        c.add_call(false);
        c.add_call(true);
        assert_eq!(c.primitive_calls, 3);
        assert_eq!(c.primitive_failures, 1);
        c.add_blocks(5);
        assert_eq!(c.blocks_submitted, 5);
    }

    #[test]
    fn merge_sums_every_field() {
        let mut total = make_counters();
        total.merge(&make_counters());
        assert_eq!(total.primitive_calls, 20);
        assert_eq!(total.primitive_failures, 2);
        assert_eq!(total.blocks_submitted, 8);
        assert_eq!(total.bytes_hashed, 600);
        assert_eq!(total.aad_bytes, 26);
        assert_eq!(total.payload_bytes, 128);
        assert_eq!(total.messages_finalized, 4);
        assert_eq!(total.records_sealed, 2);
        assert_eq!(total.records_opened, 0);
        assert_eq!(total.auth_failures, 2);
    }

    #[test]
    fn counters_json_round_trip() {
        let c = make_counters();
        let json = c.to_json().unwrap();
        assert!(json.contains("\"bytes_hashed\":300"));
        let back: SessionCounters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut t = StageTimes::default();
        t.add(Stage::Hash, Duration::from_millis(5));
        t.add(Stage::Hash, Duration::from_millis(10));
        t.add(Stage::Tag, Duration::from_millis(1));
        assert_eq!(t.get(Stage::Hash), Duration::from_millis(15));
        assert_eq!(t.get(Stage::Derive), Duration::ZERO);
        assert_eq!(t.total(), Duration::from_millis(16));
        assert!((t.get_us(Stage::Tag) - 1000.0).abs() < 1e-6);
        assert!(t.has_all(&[Stage::Hash, Stage::Tag]));
        assert!(!t.has_all(&[Stage::Hash, Stage::Cipher]));
        assert_eq!(t.iter().count(), 2);
        assert_eq!((&t).into_iter().count(), 2);
    }

    #[test]
    fn measure_returns_closure_value() {
        let mut t = StageTimes::default();
        let v = t.measure(Stage::Cipher, || {
            std::thread::sleep(Duration::from_millis(2));
            42
        });
        assert_eq!(v, 42);
        assert!(t.get(Stage::Cipher) >= Duration::from_millis(2));
    }

    #[test]
    fn merge_stage_times() {
        let mut a = StageTimes::default();
        a.add(Stage::Aad, Duration::from_millis(3));
        let mut b = StageTimes::default();
        b.add(Stage::Aad, Duration::from_millis(4));
        b.add(Stage::Payload, Duration::from_millis(7));
        a.merge(&b);
        assert_eq!(a.get(Stage::Aad), Duration::from_millis(7));
        assert_eq!(a.get(Stage::Payload), Duration::from_millis(7));
    }

    #[test]
    fn stage_display_names() {
        let names: Vec<String> = [
            Stage::Hash,
            Stage::HashFinal,
            Stage::Derive,
            Stage::Aad,
            Stage::Payload,
            Stage::Tag,
            Stage::Cipher,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(names, ["hash", "hash_final", "derive", "aad", "payload", "tag", "cipher"]);
    }

    #[test]
    fn sessions_charge_expected_stages() {
        let accel = Arc::new(SoftAccelerator::new());

        let mut d = DigestAccumulator::new(accel.clone(), DigestAlg::Sha256);
        d.update(&[0u8; 200]).unwrap();
        let mut out = [0u8; 32];
        d.finalize(&mut out).unwrap();
        assert!(d.stage_times().has_all(&[Stage::Hash, Stage::HashFinal]));

        let mut g = GcmSession::new(accel, AesKeySize::Aes128, 12).unwrap();
        g.init(Some(&[0u8; 16]), Some(&[0u8; 12]), Direction::Encrypt).unwrap();
        g.update_aad(b"aad").unwrap();
        let mut ct = [0u8; 4];
        g.update_payload(b"data", &mut ct).unwrap();
        g.finalize().unwrap();
        assert!(g.stage_times().has_all(&[Stage::Derive, Stage::Aad, Stage::Payload, Stage::Tag]));
        assert!(!g.stage_times().has_all(&[Stage::Hash]));
    }
}
