#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aes_gcm::aead::consts::{U12, U16, U20};
    use aes_gcm::aead::generic_array::GenericArray;
    use aes_gcm::aead::{Aead, KeyInit, Payload};
    use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
    use proptest::prelude::*;

    use crypto_accel::crypto::{AesKeySize, CipherMode, DigestAlg, GcmError, GcmSession, GcmState};
    use crypto_accel::primitive::{
        Accelerator, BlockCipherPrimitive, CapabilityProbe, Capabilities, Direction, GcmBlock,
        GcmDerived, GcmPrimitive, HashContext, HashPrimitive, PrimitiveError, RandomSource,
        SegmentKind, SoftAccelerator,
    };

    type Aes192Gcm = AesGcm<aes::Aes192, U12>;

    fn ref_seal<A: Aead + KeyInit>(key: &[u8], iv: &[u8], aad: &[u8], pt: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let cipher = A::new_from_slice(key).unwrap();
        let mut ct = cipher
            .encrypt(GenericArray::from_slice(iv), Payload { msg: pt, aad })
            .unwrap();
        let tag = ct.split_off(ct.len() - 16);
        (ct, tag)
    }

    fn reference(key: &[u8], iv: &[u8], aad: &[u8], pt: &[u8]) -> (Vec<u8>, Vec<u8>) {
        match (key.len(), iv.len()) {
            (16, 12) => ref_seal::<Aes128Gcm>(key, iv, aad, pt),
            (24, 12) => ref_seal::<Aes192Gcm>(key, iv, aad, pt),
            (32, 12) => ref_seal::<Aes256Gcm>(key, iv, aad, pt),
            (16, 16) => ref_seal::<AesGcm<aes::Aes128, U16>>(key, iv, aad, pt),
            (32, 20) => ref_seal::<AesGcm<aes::Aes256, U20>>(key, iv, aad, pt),
            other => panic!("no reference for {:?}", other),
        }
    }

    fn key_size(len: usize) -> AesKeySize {
        match len {
            16 => AesKeySize::Aes128,
            24 => AesKeySize::Aes192,
            _ => AesKeySize::Aes256,
        }
    }

    fn session(key_len: usize, iv_len: usize) -> GcmSession {
        GcmSession::new(Arc::new(SoftAccelerator::new()), key_size(key_len), iv_len).unwrap()
    }

    /// Split `len` at the sorted, clamped `cuts`.
    fn pieces(len: usize, cuts: &[usize]) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut start = 0;
        for &c in cuts {
            let end = c.min(len).max(start);
            out.push((start, end));
            start = end;
        }
        out.push((start, len));
        out
    }

    fn seal_chunked(
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        pt: &[u8],
        aad_cuts: &[usize],
        pt_cuts: &[usize],
    ) -> (Vec<u8>, Vec<u8>) {
        let mut s = session(key.len(), iv.len());
        s.init(Some(key), Some(iv), Direction::Encrypt).unwrap();
        for (a, b) in pieces(aad.len(), aad_cuts) {
            s.update(&aad[a..b], None).unwrap();
        }
        let mut ct = vec![0u8; pt.len()];
        for (a, b) in pieces(pt.len(), pt_cuts) {
            let n = s.update(&pt[a..b], Some(&mut ct[a..b])).unwrap();
            assert_eq!(n, b - a);
        }
        s.finalize().unwrap();
        (ct, s.tag(16).unwrap())
    }

    fn open_chunked(
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        ct: &[u8],
        tag: &[u8],
        cuts: &[usize],
    ) -> (Result<(), GcmError>, Vec<u8>) {
        let mut s = session(key.len(), iv.len());
        s.init(Some(key), Some(iv), Direction::Decrypt).unwrap();
        s.update_aad(aad).unwrap();
        let mut pt = vec![0u8; ct.len()];
        for (a, b) in pieces(ct.len(), cuts) {
            s.update_payload(&ct[a..b], &mut pt[a..b]).unwrap();
        }
        s.set_tag(tag).unwrap();
        let res = s.finalize_with_output(&mut pt);
        (res, pt)
    }

    #[test]
    fn known_answer_all_key_sizes() {
        let iv = [0x42u8; 12];
        let aad = b"header bytes";
        let pt: Vec<u8> = (0..77u8).collect();
        for key_len in [16usize, 24, 32] {
            let key: Vec<u8> = (0..key_len as u8).collect();
            let (ct, tag) = seal_chunked(&key, &iv, aad, &pt, &[], &[]);
            assert_eq!((ct, tag), reference(&key, &iv, aad, &pt), "key_len={key_len}");
        }
    }

    #[test]
    fn nist_test_case_2_zero_key() {
        // AES-128, zero key, zero IV, one zero block.
        let key = [0u8; 16];
        let iv = [0u8; 12];
        let (ct, tag) = seal_chunked(&key, &iv, &[], &[0u8; 16], &[], &[]);
        assert_eq!(hex::encode(ct), "0388dace60b6a392f328c2b971b2fe78");
        assert_eq!(hex::encode(tag), "ab6e47d42cec13bdf53a67b21257bddf");
    }

    #[test]
    fn empty_aad_and_payload_straight_to_finalize() {
        let key = [7u8; 16];
        let iv = [1u8; 12];
        let mut s = session(16, 12);
        s.init(Some(&key), Some(&iv), Direction::Encrypt).unwrap();
        assert_eq!(s.state(), GcmState::IvSet);
        s.finalize().unwrap();
        assert_eq!(s.state(), GcmState::Finalized);
        let (_, tag) = reference(&key, &iv, &[], &[]);
        assert_eq!(s.tag(16).unwrap(), tag);

        let (res, pt) = open_chunked(&key, &iv, &[], &[], &tag, &[]);
        assert_eq!(res, Ok(()));
        assert!(pt.is_empty());
    }

    #[test]
    fn non_default_iv_lengths() {
        let key = [3u8; 16];
        let iv = [9u8; 16];
        let (ct, tag) = seal_chunked(&key, &iv, b"a", b"some plaintext", &[], &[5]);
        assert_eq!((ct.clone(), tag.clone()), reference(&key, &iv, b"a", b"some plaintext"));

        let key = [4u8; 32];
        let iv = [8u8; 20];
        let (ct, tag) = seal_chunked(&key, &iv, b"", b"heap iv", &[], &[]);
        assert_eq!((ct, tag), reference(&key, &iv, b"", b"heap iv"));
    }

    #[test]
    fn key_and_iv_in_either_order() {
        let key = [5u8; 32];
        let iv = [6u8; 12];
        let run = |iv_first: bool| {
            let mut s = session(32, 12);
            if iv_first {
                s.set_iv(&iv).unwrap();
                assert_eq!(s.state(), GcmState::Uninitialized);
                s.set_key(&key, Direction::Encrypt).unwrap();
            } else {
                s.set_key(&key, Direction::Encrypt).unwrap();
                assert_eq!(s.state(), GcmState::KeySet);
                s.set_iv(&iv).unwrap();
            }
            assert_eq!(s.state(), GcmState::IvSet);
            let mut ct = [0u8; 5];
            s.update_payload(b"hello", &mut ct).unwrap();
            s.finalize().unwrap();
            (ct.to_vec(), s.tag(16).unwrap())
        };
        assert_eq!(run(true), run(false));
        assert_eq!(run(true), reference(&key, &iv, &[], b"hello"));
    }

    #[test]
    fn rekey_with_existing_iv_resets_counters() {
        let key = [1u8; 16];
        let iv = [2u8; 12];
        let mut s = session(16, 12);
        s.init(Some(&key), Some(&iv), Direction::Encrypt).unwrap();
        s.update_aad(b"stale").unwrap();
        assert_eq!(s.aad_len(), 5);
        s.init(Some(&key), None, Direction::Encrypt).unwrap();
        assert_eq!(s.aad_len(), 0);
        assert_eq!(s.state(), GcmState::IvSet);
    }

    #[test]
    fn tampering_any_bit_fails_and_wipes_output() {
        let key = [0x11u8; 16];
        let iv = [0x22u8; 12];
        let aad = b"aad";
        let pt = b"attack at dawn, bring snacks";
        let (ct, tag) = seal_chunked(&key, &iv, aad, pt, &[], &[]);

        for bit in 0..(ct.len() * 8) {
            let mut bad = ct.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            let (res, out) = open_chunked(&key, &iv, aad, &bad, &tag, &[7]);
            assert_eq!(res, Err(GcmError::TagMismatch));
            assert!(out.iter().all(|b| *b == 0));
        }
        for bit in 0..128 {
            let mut bad = tag.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            let (res, out) = open_chunked(&key, &iv, aad, &ct, &bad, &[]);
            assert_eq!(res, Err(GcmError::TagMismatch));
            assert!(out.iter().all(|b| *b == 0));
        }

        let (res, out) = open_chunked(&key, &iv, aad, &ct, &tag, &[3, 20]);
        assert_eq!(res, Ok(()));
        assert_eq!(out, pt.to_vec());
    }

    #[test]
    fn truncated_tag_verification() {
        let key = [0x31u8; 16];
        let iv = [0x32u8; 12];
        let (ct, tag) = seal_chunked(&key, &iv, b"", b"short tag", &[], &[]);
        let (res, _) = open_chunked(&key, &iv, b"", &ct, &tag[..12], &[]);
        assert_eq!(res, Ok(()));
    }

    #[test]
    fn aad_after_payload_is_ordering_error() {
        let mut s = session(16, 12);
        s.init(Some(&[0u8; 16]), Some(&[0u8; 12]), Direction::Encrypt).unwrap();
        s.update_aad(b"one").unwrap();
        let mut out = [0u8; 0];
        s.update_payload(&[], &mut out).unwrap();
        s.update_aad(b"two").unwrap();

        let mut out = [0u8; 1];
        s.update_payload(b"x", &mut out).unwrap();
        assert_eq!(s.update_aad(b"three"), Err(GcmError::AadAfterPayload));
        assert_eq!(s.update(b"three", None), Err(GcmError::AadAfterPayload));
        assert_eq!(s.aad_len(), 6);
    }

    #[test]
    fn configuration_errors() {
        let mut s = session(16, 12);
        assert_eq!(s.update_aad(b"x"), Err(GcmError::KeyNotSet));
        assert_eq!(
            s.set_key(&[0u8; 15], Direction::Encrypt),
            Err(GcmError::InvalidKeyLength { expected: 16, actual: 15 })
        );
        s.set_key(&[0u8; 16], Direction::Encrypt).unwrap();
        assert_eq!(s.update_aad(b"x"), Err(GcmError::IvNotSet));
        assert_eq!(s.set_iv(&[0u8; 11]), Err(GcmError::InvalidIvLength(11)));
        assert_eq!(s.set_iv_length(0), Err(GcmError::InvalidIvLength(0)));

        assert!(matches!(s.set_tag(&[0u8; 16]), Err(GcmError::WrongDirection { .. })));
        let mut tag = [0u8; 16];
        assert_eq!(s.get_tag(&mut tag), Err(GcmError::TagNotAvailable));
        assert_eq!(s.get_tag(&mut [0u8; 17]), Err(GcmError::InvalidTagLength(17)));

        s.set_iv(&[0u8; 12]).unwrap();
        assert_eq!(s.set_iv_length(16), Err(GcmError::IvLengthLocked));
        s.finalize().unwrap();
        assert!(!s.is_iv_set());
        assert_eq!(s.update_aad(b"x"), Err(GcmError::IvNotSet));
        assert_eq!(s.finalize(), Err(GcmError::IvNotSet));
        s.get_tag(&mut tag).unwrap();

        let mut d = session(16, 12);
        d.init(Some(&[0u8; 16]), Some(&[0u8; 12]), Direction::Decrypt).unwrap();
        assert_eq!(d.set_tag(&[]), Err(GcmError::InvalidTagLength(0)));
        assert_eq!(d.finalize(), Err(GcmError::TagNotSet));
        assert!(matches!(d.get_tag(&mut tag), Err(GcmError::WrongDirection { .. })));
        assert!(matches!(d.next_iv(&mut [0u8; 8]), Err(GcmError::WrongDirection { .. })));
    }

    #[test]
    fn set_iv_length_reallocates_before_install() {
        let mut s = session(16, 12);
        assert!(s.iv_is_embedded());
        s.set_iv_length(32).unwrap();
        assert_eq!(s.iv_len(), 32);
        assert!(!s.iv_is_embedded());
        s.set_iv_length(16).unwrap();
        assert!(s.iv_is_embedded());
    }

    #[test]
    fn iv_generation_requires_fixed_part() {
        let mut s = session(16, 12);
        s.set_key(&[0u8; 16], Direction::Encrypt).unwrap();
        assert_eq!(s.next_iv(&mut [0u8; 8]), Err(GcmError::IvGenerationDisabled));
        assert_eq!(s.set_iv_fixed(&[1, 2, 3]), Err(GcmError::InvalidFixedIv { fixed: 3, iv_len: 12 }));
        assert_eq!(s.set_iv_fixed(&[1, 2, 3, 4, 5]), Err(GcmError::InvalidFixedIv { fixed: 5, iv_len: 12 }));
        s.set_iv_fixed(&[1, 2, 3, 4]).unwrap();
        assert_eq!(&s.iv()[..4], &[1, 2, 3, 4]);
        assert_eq!(s.next_iv(&mut [0u8; 13]), Err(GcmError::InvalidIvLength(13)));
    }

    #[test]
    fn next_iv_is_monotonic_and_material_differs() {
        let key = [0x5au8; 16];
        let fixed = [0xa1u8, 0xa2, 0xa3, 0xa4];
        let mut s = session(16, 12);
        s.set_key(&key, Direction::Encrypt).unwrap();
        s.set_iv_fixed(&fixed).unwrap();

        let mut prev: Option<u64> = None;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let mut explicit = [0u8; 8];
            s.next_iv(&mut explicit).unwrap();
            let ctr = u64::from_be_bytes(explicit);
            if let Some(p) = prev {
                assert_eq!(ctr, p.wrapping_add(1));
            }
            prev = Some(ctr);

            let mut ct = [0u8; 16];
            s.update_payload(&[0u8; 16], &mut ct).unwrap();
            s.finalize().unwrap();
            assert!(seen.insert(ct), "keystream repeated");

            let mut full_iv = fixed.to_vec();
            full_iv.extend_from_slice(&explicit);
            let (ref_ct, ref_tag) = reference(&key, &full_iv, &[], &[0u8; 16]);
            assert_eq!(ct.to_vec(), ref_ct);
            assert_eq!(s.tag(16).unwrap(), ref_tag);
        }
    }

    #[test]
    fn next_iv_counter_wraps() {
        let mut s = session(16, 12);
        s.set_key(&[0u8; 16], Direction::Encrypt).unwrap();
        let mut full = [0u8; 12];
        full[4..].copy_from_slice(&[0xff; 8]);
        s.set_iv_fixed(&full).unwrap();

        let mut explicit = [0u8; 8];
        s.next_iv(&mut explicit).unwrap();
        assert_eq!(explicit, [0xff; 8]);
        assert_eq!(&s.iv()[4..], &[0u8; 8]);
        s.next_iv(&mut explicit).unwrap();
        assert_eq!(explicit, [0u8; 8]);
    }

    #[test]
    fn external_iv_low_matches_generated_iv() {
        let key = [0x77u8; 32];
        let fixed = [9u8, 8, 7, 6];

        let mut enc = session(32, 12);
        enc.set_key(&key, Direction::Encrypt).unwrap();
        enc.set_iv_fixed(&fixed).unwrap();
        let mut explicit = [0u8; 8];
        enc.next_iv(&mut explicit).unwrap();
        let mut ct = [0u8; 9];
        enc.update_payload(b"over here", &mut ct).unwrap();
        enc.finalize().unwrap();
        let tag = enc.tag(16).unwrap();

        let mut dec = session(32, 12);
        dec.set_key(&key, Direction::Decrypt).unwrap();
        dec.set_iv_fixed(&fixed).unwrap();
        assert!(matches!(dec.next_iv(&mut [0u8; 8]), Err(GcmError::WrongDirection { .. })));
        dec.set_external_iv_low(&explicit).unwrap();
        assert!(dec.is_iv_set());
        let mut pt = [0u8; 9];
        dec.update_payload(&ct, &mut pt).unwrap();
        dec.set_tag(&tag).unwrap();
        dec.finalize().unwrap();
        assert_eq!(&pt, b"over here");
    }

    #[test]
    fn copy_session_does_not_alias_iv() {
        for iv_len in [12usize, 20] {
            let key = [0x66u8; 32];
            let iv = vec![0x10u8; iv_len];
            let mut a = session(32, iv_len);
            a.set_key(&key, Direction::Encrypt).unwrap();
            a.set_iv_fixed(&iv).unwrap();
            assert_eq!(a.iv_is_embedded(), iv_len <= 16);

            let mut b = a.copy_session();
            assert_eq!(b.iv_is_embedded(), a.iv_is_embedded());
            for _ in 0..3 {
                b.next_iv(&mut [0u8; 8]).unwrap();
            }
            assert_ne!(b.iv(), a.iv());
            assert_eq!(a.iv(), iv.as_slice());

            let mut explicit = [0u8; 8];
            a.next_iv(&mut explicit).unwrap();
            assert_eq!(explicit.to_vec(), iv[iv_len - 8..].to_vec());
            let mut ct = [0u8; 4];
            a.update_payload(b"data", &mut ct).unwrap();
            a.finalize().unwrap();
            let (ref_ct, ref_tag) = reference(&key, &iv, &[], b"data");
            assert_eq!(ct.to_vec(), ref_ct);
            assert_eq!(a.tag(16).unwrap(), ref_tag);
        }
    }

    #[test]
    fn copy_mid_message_continues_independently() {
        let key = [0x12u8; 16];
        let iv = [0x34u8; 12];
        let mut a = session(16, 12);
        a.init(Some(&key), Some(&iv), Direction::Encrypt).unwrap();
        a.update_aad(b"shared aad").unwrap();
        let mut head = [0u8; 7];
        a.update_payload(b"prefix-", &mut head).unwrap();

        let mut b = a.copy_session();
        let mut ta = [0u8; 1];
        let mut tb = [0u8; 1];
        a.update_payload(b"A", &mut ta).unwrap();
        b.update_payload(b"B", &mut tb).unwrap();
        a.finalize().unwrap();
        b.finalize().unwrap();

        let (ra, rtag_a) = reference(&key, &iv, b"shared aad", b"prefix-A");
        let (rb, rtag_b) = reference(&key, &iv, b"shared aad", b"prefix-B");
        assert_eq!([&head[..], &ta[..]].concat(), ra);
        assert_eq!([&head[..], &tb[..]].concat(), rb);
        assert_eq!(a.tag(16).unwrap(), rtag_a);
        assert_eq!(b.tag(16).unwrap(), rtag_b);
    }

    #[test]
    fn counters_follow_the_message() {
        let mut s = session(16, 12);
        s.init(Some(&[1u8; 16]), Some(&[2u8; 12]), Direction::Encrypt).unwrap();
        s.update_aad(&[0u8; 20]).unwrap();
        let mut out = [0u8; 40];
        s.update_payload(&[0u8; 40], &mut out).unwrap();
        s.finalize().unwrap();
        let c = s.counters();
        assert_eq!(c.aad_bytes, 20);
        assert_eq!(c.payload_bytes, 40);
        assert_eq!(c.messages_finalized, 1);
        assert_eq!(c.primitive_failures, 0);
        assert!(c.primitive_calls >= 4);
    }

    #[test]
    fn short_iv_cannot_generate() {
        let mut s = session(16, 4);
        s.set_key(&[1u8; 16], Direction::Encrypt).unwrap();
        assert_eq!(
            s.set_iv_fixed(&[1, 2, 3, 4]),
            Err(GcmError::InvalidFixedIv { fixed: 4, iv_len: 4 })
        );
        let mut out = [0u8; 4];
        assert_eq!(s.next_iv(&mut out), Err(GcmError::IvGenerationDisabled));

        // Growing the IV afterwards makes generation available again.
        s.set_iv_length(8).unwrap();
        s.set_iv_fixed(&[0u8; 8]).unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let mut low = [0u8; 8];
            s.next_iv(&mut low).unwrap();
            s.finalize().unwrap();
            seen.push((low, s.tag(16).unwrap()));
        }
        assert_eq!(seen[0].0, [0u8; 8]);
        assert_eq!(seen[1].0, 1u64.to_be_bytes());
        assert_ne!(seen[0].1, seen[1].1);
        assert_ne!(seen[1].1, seen[2].1);
    }

    #[test]
    fn fixed_prefix_before_key_waits_for_direction() {
        let fixed = [0xc0u8, 0xff, 0xee, 0x00];

        // Decrypt: no random filler, the peer supplies the low bytes.
        let mut dec = session(16, 12);
        dec.set_iv_fixed(&fixed).unwrap();
        dec.set_key(&[3u8; 16], Direction::Decrypt).unwrap();
        assert_eq!(&dec.iv()[..4], &fixed);
        assert!(dec.iv()[4..].iter().all(|&b| b == 0));
        dec.set_external_iv_low(&[9u8; 8]).unwrap();
        assert_eq!(&dec.iv()[4..], &[9u8; 8]);

        // Encrypt: filled on the first generated IV, prefix kept.
        let mut a = session(16, 12);
        let mut b = session(16, 12);
        for s in [&mut a, &mut b] {
            s.set_iv_fixed(&fixed).unwrap();
            s.set_key(&[3u8; 16], Direction::Encrypt).unwrap();
        }
        let (mut la, mut lb) = ([0u8; 8], [0u8; 8]);
        a.next_iv(&mut la).unwrap();
        b.next_iv(&mut lb).unwrap();
        assert_eq!(&a.iv()[..4], &fixed);
        assert_ne!(la, lb);
        assert_eq!(a.counters().primitive_failures, 0);
    }

    /// Which GCM call the broken backend refuses.
    #[derive(Clone, Copy, PartialEq)]
    enum FailAt {
        Intermediate,
        Last,
    }

    /// Soft backend with one GCM call that always fails.
    struct BrokenGcm(SoftAccelerator, FailAt);

    impl HashPrimitive for BrokenGcm {
        fn hash_segment(&self, a: DigestAlg, k: SegmentKind, d: &[u8], c: &mut HashContext, o: &mut [u8]) -> Result<(), PrimitiveError> {
            self.0.hash_segment(a, k, d, c, o)
        }
    }

    impl GcmPrimitive for BrokenGcm {
        fn gcm_initialize(&self, iv: &[u8], key: &[u8], d: Direction) -> Result<GcmDerived, PrimitiveError> {
            self.0.gcm_initialize(iv, key, d)
        }
        fn gcm_intermediate(
            &self,
            buf: &mut [u8],
            ucb: &mut GcmBlock,
            aad: &[u8],
            tm: &mut GcmBlock,
            key: &[u8],
            h: &GcmBlock,
            d: Direction,
        ) -> Result<(), PrimitiveError> {
            if self.1 == FailAt::Intermediate {
                return Err(PrimitiveError::RequestFailed { op: "gcm_intermediate" });
            }
            self.0.gcm_intermediate(buf, ucb, aad, tm, key, h, d)
        }
        fn gcm_last(
            &self,
            icb: &GcmBlock,
            a: u64,
            p: u64,
            tm: &GcmBlock,
            key: &[u8],
            h: &GcmBlock,
            d: Direction,
        ) -> Result<GcmBlock, PrimitiveError> {
            if self.1 == FailAt::Last {
                return Err(PrimitiveError::RequestFailed { op: "gcm_last" });
            }
            self.0.gcm_last(icb, a, p, tm, key, h, d)
        }
    }

    impl BlockCipherPrimitive for BrokenGcm {
        fn block_cipher(&self, m: CipherMode, d: Direction, k: &[u8], iv: &mut GcmBlock, b: &mut [u8]) -> Result<(), PrimitiveError> {
            self.0.block_cipher(m, d, k, iv, b)
        }
    }

    impl RandomSource for BrokenGcm {
        fn random_bytes(&self, buf: &mut [u8]) -> Result<(), PrimitiveError> {
            self.0.random_bytes(buf)
        }
    }

    impl CapabilityProbe for BrokenGcm {
        fn capabilities(&self) -> Result<Capabilities, PrimitiveError> {
            self.0.capabilities()
        }
    }

    impl Accelerator for BrokenGcm {
        fn name(&self) -> &'static str {
            "broken-gcm"
        }
    }

    #[test]
    fn primitive_failure_is_reported_as_request_failed() {
        let broken = BrokenGcm(SoftAccelerator::new(), FailAt::Intermediate);
        let mut s = GcmSession::new(Arc::new(broken), AesKeySize::Aes128, 12).unwrap();
        s.init(Some(&[0u8; 16]), Some(&[0u8; 12]), Direction::Encrypt).unwrap();
        let err = s.update_aad(b"aad").unwrap_err();
        assert!(matches!(err, GcmError::RequestFailed(PrimitiveError::RequestFailed { .. })));
        assert_eq!(s.aad_len(), 0);
        assert_eq!(s.counters().primitive_failures, 1);
    }

    #[test]
    fn failed_tag_computation_exposes_no_tag() {
        let broken = BrokenGcm(SoftAccelerator::new(), FailAt::Last);
        let mut s = GcmSession::new(Arc::new(broken), AesKeySize::Aes128, 12).unwrap();
        s.init(Some(&[0u8; 16]), Some(&[0u8; 12]), Direction::Encrypt).unwrap();
        let mut out = [0u8; 3];
        s.update_payload(b"abc", &mut out).unwrap();

        assert_eq!(
            s.finalize(),
            Err(GcmError::RequestFailed(PrimitiveError::RequestFailed { op: "gcm_last" }))
        );
        assert_ne!(s.state(), GcmState::Finalized);
        assert_eq!(s.tag(16), Err(GcmError::TagNotAvailable));
        let mut tag = [0u8; 16];
        assert_eq!(s.get_tag(&mut tag), Err(GcmError::TagNotAvailable));
        assert_eq!(s.counters().messages_finalized, 0);
        // A fresh IV is still required.
        assert!(!s.is_iv_set());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_chunked_seal_matches_reference_and_opens(
            key in proptest::collection::vec(any::<u8>(), 16..=16),
            iv in any::<[u8; 12]>(),
            aad in proptest::collection::vec(any::<u8>(), 0..80),
            pt in proptest::collection::vec(any::<u8>(), 0..200),
            mut aad_cuts in proptest::collection::vec(0usize..80, 0..5),
            mut pt_cuts in proptest::collection::vec(0usize..200, 0..8),
            mut open_cuts in proptest::collection::vec(0usize..200, 0..8),
        ) {
            aad_cuts.sort_unstable();
            pt_cuts.sort_unstable();
            open_cuts.sort_unstable();

            let (ct, tag) = seal_chunked(&key, &iv, &aad, &pt, &aad_cuts, &pt_cuts);
            let (ref_ct, ref_tag) = reference(&key, &iv, &aad, &pt);
            prop_assert_eq!(&ct, &ref_ct);
            prop_assert_eq!(&tag, &ref_tag);

            let (res, out) = open_chunked(&key, &iv, &aad, &ct, &tag, &open_cuts);
            prop_assert_eq!(res, Ok(()));
            prop_assert_eq!(out, pt);
        }
    }
}
