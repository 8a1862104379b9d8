//! End-to-end exchange tests: a real connection on one side, a scripted phy
//! on its own thread on the other, talking over a Unix socket pair.

use phylink_device::{
    Connection, DecisionStrategy, DeviceError, LinkState, UnixTransport,
};
use phylink_sim::{BoundPhy, PhyThread, ScriptedPhy, SessionConfig, SimError};
use phylink_wire::{
    AbortSchedule, CcaRequest, CcaResult, Frequency, Modulation, Power, RadioParams, RssiPower,
    RssiRequest, RssiResult, RxRequest, RxResult, RxStatus, StopCondition, TxRequest, TxResult,
    TIME_NEVER,
};

fn connected<F>(script: F) -> (Connection<UnixTransport>, PhyThread)
where
    F: FnOnce(&mut ScriptedPhy) -> Result<(), SimError> + Send + 'static,
{
    let (transport, phy) = ScriptedPhy::spawn(script).unwrap();
    (Connection::from_transport(transport), phy)
}

#[test]
fn tx_round_trip_with_payload() {
    let (mut conn, phy) = connected(|phy| {
        let (req, packet) = phy.expect_tx()?;
        assert_eq!(req.start_time, 100);
        assert_eq!(req.end_time, 260);
        assert_eq!(req.phy_address, 0x8E89BED6);
        assert_eq!(&packet, b"advertising payload!");
        phy.send_tx_end(&TxResult { end_time: 260 })?;
        Ok(())
    });

    let req = TxRequest {
        start_time: 100,
        end_time: 260,
        abort: AbortSchedule::never(),
        phy_address: 0x8E89BED6,
        radio_params: RadioParams {
            modulation: Modulation::BLE_1M,
            center_freq: Frequency::from_ble_channel(37).unwrap(),
        },
        power_level: Power::from_dbm(0.0),
        packet_size: 20,
    };
    let done = conn.transmit(&req, b"advertising payload!").unwrap();
    assert_eq!(done.end_time, 260);
    assert!(conn.is_connected());
    phy.join().unwrap();
}

#[test]
fn tx_answers_reevaluation_pokes() {
    /// Extends the abort once, then gives up on rechecking
    struct Extend {
        calls: u32,
    }
    impl DecisionStrategy for Extend {
        fn reevaluate_abort(&mut self, schedule: &mut AbortSchedule) {
            self.calls += 1;
            if self.calls == 1 {
                *schedule = AbortSchedule {
                    abort_time: 2200,
                    recheck_time: 1800,
                };
            } else {
                schedule.recheck_time = TIME_NEVER;
            }
        }
    }

    let (transport, phy) = ScriptedPhy::spawn(|phy| {
        let (req, _) = phy.expect_tx()?;
        assert_eq!(req.abort.abort_time, 2000);
        assert_eq!(req.abort.recheck_time, 1500);

        let first = phy.poke_reevaluation()?;
        assert_eq!(first.abort_time, 2200);
        assert_eq!(first.recheck_time, 1800);

        let second = phy.poke_reevaluation()?;
        assert_eq!(second.abort_time, 2200);
        assert_eq!(second.recheck_time, TIME_NEVER);

        phy.send_tx_end(&TxResult { end_time: 2100 })?;
        Ok(())
    })
    .unwrap();

    let mut conn = Connection::with_strategy(transport, Box::new(Extend { calls: 0 }));
    let req = TxRequest {
        start_time: 1000,
        end_time: 2100,
        abort: AbortSchedule {
            abort_time: 2000,
            recheck_time: 1500,
        },
        packet_size: 1,
        ..TxRequest::default()
    };
    let done = conn.transmit(&req, b"x").unwrap();
    assert_eq!(done.end_time, 2100);
    phy.join().unwrap();
}

#[test]
fn rx_accepts_matching_packet() {
    /// Extends the abort when asked and checks what it is offered
    struct Watcher;
    impl DecisionStrategy for Watcher {
        fn reevaluate_abort(&mut self, schedule: &mut AbortSchedule) {
            *schedule = AbortSchedule {
                abort_time: 2200,
                recheck_time: TIME_NEVER,
            };
        }
        fn accept_packet(&mut self, partial: &RxResult, packet: &[u8]) -> bool {
            assert_eq!(partial.status, RxStatus::InProgress);
            assert_eq!(packet, b"twenty bytes of data");
            true
        }
    }

    let (transport, phy) = ScriptedPhy::spawn(|phy| {
        let req = phy.expect_rx()?;
        assert_eq!(req.start_time, 1000);
        assert_eq!(req.scan_duration, 500);
        assert_eq!(req.abort.abort_time, 2000);
        assert_eq!(req.abort.recheck_time, 1500);

        let revised = phy.poke_reevaluation()?;
        assert_eq!(revised.abort_time, 2200);
        assert_eq!(revised.recheck_time, TIME_NEVER);

        let partial = RxResult {
            status: RxStatus::InProgress,
            packet_size: 20,
            rx_time_stamp: 1040,
            end_time: 1040,
            rssi: RssiPower::from_dbm(-58.0),
        };
        phy.send_rx_address_found(&partial, b"twenty bytes of data")?;
        assert!(phy.expect_rx_decision()?);

        phy.send_rx_end(&RxResult {
            status: RxStatus::Ok,
            end_time: 1200,
            ..partial
        })?;
        Ok(())
    })
    .unwrap();

    let mut conn = Connection::with_strategy(transport, Box::new(Watcher));
    let req = RxRequest {
        start_time: 1000,
        scan_duration: 500,
        phy_address: 0x8E89BED6,
        abort: AbortSchedule {
            abort_time: 2000,
            recheck_time: 1500,
        },
        ..RxRequest::default()
    };
    let completion = conn.receive(&req, None).unwrap();
    assert!(completion.accepted);
    assert_eq!(completion.result.status, RxStatus::Ok);
    assert_eq!(completion.result.end_time, 1200);
    assert_eq!(completion.packet.as_slice(), b"twenty bytes of data");
    assert!(conn.is_connected());
    phy.join().unwrap();
}

#[test]
fn rx_rejection_stops_reception() {
    struct RejectAll;
    impl DecisionStrategy for RejectAll {
        fn reevaluate_abort(&mut self, schedule: &mut AbortSchedule) {
            schedule.recheck_time = TIME_NEVER;
        }
        fn accept_packet(&mut self, _: &RxResult, _: &[u8]) -> bool {
            false
        }
    }

    let (transport, phy) = ScriptedPhy::spawn(|phy| {
        phy.expect_rx()?;
        let partial = RxResult {
            status: RxStatus::InProgress,
            packet_size: 4,
            rx_time_stamp: 1040,
            end_time: 1040,
            rssi: RssiPower::from_dbm(-58.0),
        };
        phy.send_rx_address_found(&partial, b"pkt!")?;
        assert!(!phy.expect_rx_decision()?);
        // no final result follows a rejection
        Ok(())
    })
    .unwrap();

    let mut conn = Connection::with_strategy(transport, Box::new(RejectAll));
    let completion = conn.receive(&RxRequest::default(), None).unwrap();
    assert!(!completion.accepted);
    assert_eq!(completion.result.status, RxStatus::InProgress);
    assert_eq!(completion.packet.as_slice(), b"pkt!");
    // the connection survives and can run the next exchange
    assert!(conn.is_connected());
    phy.join().unwrap();
}

#[test]
fn rx_scan_window_closes_without_sync() {
    let (mut conn, phy) = connected(|phy| {
        phy.expect_rx()?;
        phy.send_rx_end(&RxResult {
            status: RxStatus::NoSync,
            packet_size: 0,
            rx_time_stamp: 1500,
            end_time: 1500,
            rssi: RssiPower::MIN,
        })?;
        Ok(())
    });

    let completion = conn.receive(&RxRequest::default(), None).unwrap();
    assert!(!completion.accepted);
    assert_eq!(completion.result.status, RxStatus::NoSync);
    assert!(completion.packet.is_empty());
    phy.join().unwrap();
}

#[test]
fn rx_undersized_buffer_causes_orderly_disconnect() {
    let (mut conn, phy) = connected(|phy| {
        phy.expect_rx()?;
        let partial = RxResult {
            status: RxStatus::InProgress,
            packet_size: 20,
            rx_time_stamp: 1040,
            end_time: 1040,
            rssi: RssiPower::from_dbm(-58.0),
        };
        phy.send_rx_address_found(&partial, b"twenty bytes of data")?;
        phy.expect_disconnect()?;
        Ok(())
    });

    let mut small = [0u8; 5];
    let err = conn
        .receive(&RxRequest::default(), Some(&mut small))
        .unwrap_err();
    assert!(matches!(
        err,
        DeviceError::BufferTooSmall {
            packet_size: 20,
            capacity: 5
        }
    ));
    assert_eq!(conn.state(), LinkState::Disconnected);
    phy.join().unwrap();
}

#[test]
fn rssi_measurement() {
    let (mut conn, phy) = connected(|phy| {
        let req = phy.expect_rssi()?;
        assert_eq!(req.meas_time, 3000);
        phy.send_rssi_end(&RssiResult {
            rssi: RssiPower::from_dbm(-63.5),
        })?;
        Ok(())
    });

    let req = RssiRequest {
        meas_time: 3000,
        radio_params: RadioParams {
            modulation: Modulation::BLE_1M,
            center_freq: Frequency::from_ble_channel(0).unwrap(),
        },
        antenna_gain: Power::from_dbm(0.0),
    };
    let result = conn.measure_rssi(&req).unwrap();
    assert!((result.rssi.to_dbm() + 63.5).abs() < 1e-4);
    phy.join().unwrap();
}

#[test]
fn cca_with_reevaluation() {
    let (mut conn, phy) = connected(|phy| {
        let req = phy.expect_cca()?;
        assert_eq!(req.scan_duration, 128);
        assert_eq!(req.scan_period, 16);
        assert_eq!(req.stop_when_found, StopCondition::OnEither);

        // the default strategy keeps the abort and declines future rechecks
        let revised = phy.poke_reevaluation()?;
        assert_eq!(revised.abort_time, req.abort.abort_time);
        assert_eq!(revised.recheck_time, TIME_NEVER);

        phy.send_cca_end(&CcaResult {
            end_time: 5128,
            rssi_ave: RssiPower::from_dbm(-80.0),
            rssi_max: RssiPower::from_dbm(-68.0),
            mod_rx_power: RssiPower::MIN,
            mod_found: false,
            rssi_overthreshold: true,
        })?;
        Ok(())
    });

    let req = CcaRequest {
        start_time: 5000,
        abort: AbortSchedule {
            abort_time: 6000,
            recheck_time: 5500,
        },
        scan_duration: 128,
        scan_period: 16,
        mod_threshold: RssiPower::from_dbm(-75.0),
        rssi_threshold: RssiPower::from_dbm(-70.0),
        stop_when_found: StopCondition::OnEither,
        ..CcaRequest::default()
    };
    let result = conn.assess_channel(&req).unwrap();
    assert_eq!(result.end_time, 5128);
    assert!(!result.mod_found);
    assert!(result.rssi_overthreshold);
    phy.join().unwrap();
}

#[test]
fn wait_nowait_then_pickup() {
    let (mut conn, phy) = connected(|phy| {
        let req = phy.expect_wait()?;
        assert_eq!(req.end_time, 9000);
        phy.send_wait_end()?;
        Ok(())
    });

    conn.advance_time_nowait(9000).unwrap();
    // something else while the phy advances time for everyone
    conn.pickup_wait().unwrap();
    assert!(conn.is_connected());
    phy.join().unwrap();
}

#[test]
fn phy_disconnect_ends_session() {
    let (mut conn, phy) = connected(|phy| {
        phy.expect_wait()?;
        phy.send_disconnect()?;
        Ok(())
    });

    let err = conn.advance_time(9000).unwrap_err();
    assert!(matches!(err, DeviceError::SessionEnded));
    assert_eq!(conn.state(), LinkState::Disconnected);

    // the connection fails fast from now on
    let err = conn.advance_time(9500).unwrap_err();
    assert!(matches!(err, DeviceError::NotConnected));
    phy.join().unwrap();
}

#[test]
fn terminate_handshake() {
    let (conn, phy) = connected(|phy| {
        phy.expect_terminate()?;
        phy.send_disconnect()?;
        Ok(())
    });

    conn.terminate().unwrap();
    phy.join().unwrap();
}

#[test]
fn connect_over_session_socket() {
    let config = SessionConfig {
        endpoint: std::env::temp_dir().join(format!("phylink-test-{}", std::process::id())),
        session_id: "s1".to_string(),
    };
    let bound = BoundPhy::bind(&config, 4).unwrap();

    let script = std::thread::spawn(move || -> Result<(), SimError> {
        let mut phy = bound.accept()?;
        let req = phy.expect_wait()?;
        assert_eq!(req.end_time, 100);
        phy.send_wait_end()?;
        phy.expect_disconnect()?;
        Ok(())
    });

    let mut conn = Connection::connect(4, &config.endpoint, "s1").unwrap();
    conn.advance_time(100).unwrap();
    conn.disconnect();
    script.join().unwrap().unwrap();

    let _ = std::fs::remove_dir_all(&config.endpoint);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // sockets and threads per case, so keep the case count down
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_tx_payload_passes_through_unmodified(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let sent = payload.clone();
            let (transport, phy) = ScriptedPhy::spawn(move |phy| {
                let (_, packet) = phy.expect_tx()?;
                assert_eq!(packet, sent);
                phy.send_tx_end(&TxResult { end_time: 1 })?;
                Ok(())
            }).unwrap();

            let mut conn = Connection::from_transport(transport);
            let req = TxRequest {
                abort: AbortSchedule::never(),
                packet_size: payload.len() as u16,
                ..TxRequest::default()
            };
            conn.transmit(&req, &payload).unwrap();
            phy.join().unwrap();
        }
    }
}
