//! WinRT advertisement watcher.

use crate::domain::models::{AppEvent, ScannedDevice};
use crate::infrastructure::bluetooth::{parse_service_uuid, DiscoveryBackend};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use windows::core::GUID;
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEScanningMode,
};
use windows::Foundation::TypedEventHandler;

pub struct BleScanner {
    watcher: Option<BluetoothLEAdvertisementWatcher>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl BleScanner {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            watcher: None,
            event_sender,
        }
    }
}

impl DiscoveryBackend for BleScanner {
    fn name(&self) -> &'static str {
        "WinRT advertisement watcher"
    }

    fn start(&mut self, service_uuid: Option<&str>) -> Result<()> {
        self.stop()?;

        let target_uuid = service_uuid.map(parse_uuid).transpose()?;
        info!("Starting BLE scan (service filter: {:?})", service_uuid);

        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        watcher.SetScanningMode(BluetoothLEScanningMode::Active)?;

        let sender = self.event_sender.clone();
        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let adv = args.Advertisement()?;

                    let mut found = target_uuid.is_none();
                    if let Some(target) = target_uuid {
                        let service_uuids = adv.ServiceUuids()?;
                        for i in 0..service_uuids.Size()? {
                            if service_uuids.GetAt(i)? == target {
                                found = true;
                                break;
                            }
                        }
                    }

                    if found {
                        let name = adv.LocalName()?.to_string();
                        let device = ScannedDevice {
                            name: if name.is_empty() {
                                "Unknown".to_string()
                            } else {
                                name
                            },
                            address: args.BluetoothAddress()?,
                            signal_strength: args.RawSignalStrengthInDBm()?,
                        };
                        let _ = sender.send(AppEvent::DeviceFound(device));
                    }
                }
                Ok(())
            },
        );

        watcher.Received(&handler)?;
        watcher.Start()?;
        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(watcher) = self.watcher.take() {
            info!("Stopping BLE scan");
            watcher.Stop()?;
        }
        Ok(())
    }

    fn is_scanning(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for BleScanner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Parse a UUID string into a Windows GUID
pub fn parse_uuid(uuid_str: &str) -> Result<GUID> {
    Ok(GUID::from_u128(parse_service_uuid(uuid_str)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid() {
        let guid = parse_uuid("0000180d-0000-1000-8000-00805f9b34fb").unwrap();
        assert_eq!(guid.data1, 0x0000180d);
        assert_eq!(guid.data4[7], 0xfb);
        assert!(parse_uuid("180d").is_err());
        assert!(parse_uuid(&format!("0000000\u{e9}{}", "0".repeat(23))).is_err());
    }
}
