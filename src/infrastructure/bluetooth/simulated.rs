//! Advertisement source for machines without a usable BLE stack.

use crate::domain::models::{AppEvent, ScannedDevice};
use crate::infrastructure::bluetooth::{parse_service_uuid, DiscoveryBackend};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

const HEART_RATE_SERVICE: &str = "0000180d-0000-1000-8000-00805f9b34fb";
const BATTERY_SERVICE: &str = "0000180f-0000-1000-8000-00805f9b34fb";

struct Advertiser {
    name: &'static str,
    address: u64,
    rssi: i16,
    services: &'static [&'static str],
}

static CATALOG: &[Advertiser] = &[
    Advertiser {
        name: "Polar H10",
        address: 0xC0_4E_21_9A_11_02,
        rssi: -58,
        services: &[HEART_RATE_SERVICE, BATTERY_SERVICE],
    },
    Advertiser {
        name: "Thermo Beacon",
        address: 0xA4_C1_38_0F_77_5D,
        rssi: -71,
        services: &[BATTERY_SERVICE],
    },
    Advertiser {
        name: "",
        address: 0x5B_E2_91_40_3C_88,
        rssi: -86,
        services: &[],
    },
    Advertiser {
        name: "Mi Band 6",
        address: 0xF7_12_66_A9_D0_31,
        rssi: -64,
        services: &[HEART_RATE_SERVICE],
    },
];

pub struct SimulatedScanner {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl SimulatedScanner {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self::with_interval(event_sender, Duration::from_millis(400))
    }

    pub fn with_interval(event_sender: mpsc::UnboundedSender<AppEvent>, interval: Duration) -> Self {
        Self {
            event_sender,
            interval,
            task: None,
        }
    }
}

fn advertises(advertiser: &Advertiser, service_uuid: Option<u128>) -> bool {
    match service_uuid {
        None => true,
        Some(uuid) => advertiser
            .services
            .iter()
            .any(|s| parse_service_uuid(s).is_ok_and(|s| s == uuid)),
    }
}

impl DiscoveryBackend for SimulatedScanner {
    fn name(&self) -> &'static str {
        "simulated advertisements"
    }

    fn start(&mut self, service_uuid: Option<&str>) -> Result<()> {
        self.stop()?;

        let target_uuid = service_uuid.map(parse_service_uuid).transpose()?;
        let matching: Vec<&'static Advertiser> = CATALOG
            .iter()
            .filter(|a| advertises(a, target_uuid))
            .collect();
        info!(
            "Starting simulated BLE scan, {} advertiser(s) in range",
            matching.len()
        );

        let sender = self.event_sender.clone();
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            if matching.is_empty() {
                return;
            }
            let mut ticker = tokio::time::interval(interval);
            let mut tick: usize = 0;
            loop {
                ticker.tick().await;
                let advertiser = matching[tick % matching.len()];
                let jitter = ((tick * 7) % 9) as i16 - 4;
                let device = ScannedDevice {
                    name: if advertiser.name.is_empty() {
                        "Unknown".to_string()
                    } else {
                        advertiser.name.to_string()
                    },
                    address: advertiser.address,
                    signal_strength: advertiser.rssi + jitter,
                };
                if sender.send(AppEvent::DeviceFound(device)).is_err() {
                    break;
                }
                tick = tick.wrapping_add(1);
            }
        }));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            info!("Stopping simulated BLE scan");
            task.abort();
        }
        Ok(())
    }

    fn is_scanning(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SimulatedScanner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_devices_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scanner = SimulatedScanner::with_interval(tx, Duration::from_millis(5));

        scanner.start(None).unwrap();
        assert!(scanner.is_scanning());

        let mut seen = Vec::new();
        while seen.len() < CATALOG.len() {
            match rx.recv().await {
                Some(AppEvent::DeviceFound(device)) => seen.push(device),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(seen.iter().any(|d| d.name == "Unknown"));

        scanner.stop().unwrap();
        assert!(!scanner.is_scanning());
    }

    #[tokio::test]
    async fn test_service_filter() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scanner = SimulatedScanner::with_interval(tx, Duration::from_millis(5));

        scanner
            .start(Some("0000180D-0000-1000-8000-00805F9B34FB"))
            .unwrap();
        for _ in 0..6 {
            match rx.recv().await {
                Some(AppEvent::DeviceFound(device)) => {
                    assert!(device.name == "Polar H10" || device.name == "Mi Band 6");
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        scanner.stop().unwrap();
    }

    #[test]
    fn test_unknown_service_matches_nothing() {
        let unknown = parse_service_uuid("0000feed-0000-1000-8000-00805f9b34fb").unwrap();
        assert!(!CATALOG.iter().any(|a| advertises(a, Some(unknown))));
    }

    #[test]
    fn test_malformed_filter_is_an_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scanner = SimulatedScanner::new(tx);
        assert!(scanner.start(Some("heart-rate")).is_err());
        assert!(!scanner.is_scanning());
    }
}
