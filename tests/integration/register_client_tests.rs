//! Register client against the scripted bus.

use crate::mock_hw::{BusCall, EIO, MockBus};

use ups_pico::app::register_client::RegisterClient;
use ups_pico::error::Error;
use ups_pico::registers::{self, PicoKey, PowerSource, TemperatureProbe};

#[test]
fn typed_accessors_decode_register_values() {
    let mut bus = MockBus::new();
    bus.set(registers::BATTERY_VOLTAGE, 0x0414)
        .set(registers::HOST_VOLTAGE, 0x0532)
        .set(registers::MODE, 2)
        .set(registers::FIRMWARE_VERSION, 0x26)
        .set(TemperatureProbe::First.register(), 31);
    let mut client = RegisterClient::new(bus);

    assert!((client.battery_voltage().unwrap() - 4.20).abs() < 1e-4);
    assert!((client.host_voltage().unwrap() - 5.50).abs() < 1e-4);
    assert_eq!(client.power_source().unwrap(), PowerSource::Battery);
    assert_eq!(client.firmware_version().unwrap(), 0x26);
    assert_eq!(client.temperature(TemperatureProbe::First).unwrap(), 31);
}

#[test]
fn address_is_reselected_only_on_device_change() {
    let mut client = RegisterClient::new(MockBus::new());

    client.mode().unwrap();
    client.key_status(PicoKey::A).unwrap();
    client.firmware_version().unwrap();
    client.key_status(PicoKey::B).unwrap();

    let selects: Vec<_> = client
        .bus()
        .calls
        .iter()
        .filter_map(|c| match c {
            BusCall::Select(d) => Some(*d),
            _ => None,
        })
        .collect();
    assert_eq!(selects, vec![0x69, 0x6b, 0x69]);
    assert_eq!(client.selected_address(), Some(0x69));
}

#[test]
fn failed_select_is_retried_on_next_access() {
    let mut bus = MockBus::new();
    bus.fail_select = Some(EIO);
    let mut client = RegisterClient::new(bus);

    assert!(matches!(
        client.mode(),
        Err(Error::AddressSelect { device: 0x69, .. })
    ));
    assert_eq!(client.selected_address(), None);

    let mut bus = client.into_bus();
    bus.fail_select = None;
    let mut client = RegisterClient::new(bus);
    client.mode().unwrap();
    assert_eq!(client.selected_address(), Some(0x69));
}

#[test]
fn read_failure_names_the_register() {
    let mut bus = MockBus::new();
    bus.fail_next(PicoKey::C.status_register(), EIO);
    let mut client = RegisterClient::new(bus);

    let err = client.key_status(PicoKey::C).unwrap_err();
    assert_eq!(
        err,
        Error::Transport {
            device: 0x69,
            register: 0x0b,
            code: EIO,
        }
    );
    assert!(!err.is_setup_failure());
    // The select stuck even though the read failed.
    assert_eq!(client.selected_address(), Some(0x69));
}

#[test]
fn reset_key_writes_zero_to_its_register() {
    let mut client = RegisterClient::new(MockBus::new());
    client.reset_key(PicoKey::B).unwrap();
    assert_eq!(client.bus().writes(), vec![(PicoKey::B.status_register(), 0)]);
}

#[test]
fn values_are_never_cached() {
    let mut bus = MockBus::new();
    bus.script(registers::MODE, &[1, 2]);
    let mut client = RegisterClient::new(bus);
    assert_eq!(client.power_source().unwrap(), PowerSource::Host);
    assert_eq!(client.power_source().unwrap(), PowerSource::Battery);
}
