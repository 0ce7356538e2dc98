mod common;

use common::{user, Fixture};
use nexus_config::{DEFAULT_GAS_LIMIT, MAX_EVENT_DATA_SIZE};
use nexus_core::{Address, BinEncode, Event, EventKind, GasEventData, SystemEventKind};
use nexus_runtime::RuntimeError;
use nexus_vm::{ExecutionState, ScriptBuilder, VmObject};

fn escrow_payload() -> Vec<u8> {
    GasEventData {
        address: user("miner"),
        price: 1,
        amount: 100,
    }
    .to_bin()
}

#[test]
fn gas_events_outside_the_gas_context_are_rejected() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let before = engine.events().len();

    let result = engine.notify(SystemEventKind::GasEscrow, user("payer"), escrow_payload());

    assert!(matches!(result, Err(RuntimeError::Assertion(_))));
    assert_eq!(engine.events().len(), before);
    assert_eq!(engine.gas().max(), DEFAULT_GAS_LIMIT);
}

#[test]
fn unrestricted_and_custom_kinds_are_recorded_in_order() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let alice = user("alice");

    engine
        .notify(SystemEventKind::Log, alice, b"hello".to_vec())
        .unwrap();
    engine
        .notify(EventKind::custom(3).unwrap(), alice, vec![1, 2])
        .unwrap();

    let events = engine.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::Known(SystemEventKind::Log));
    assert_eq!(events[1].kind, EventKind::Custom(3));
    assert!(events.iter().all(|event| event.contract == "entry"));
}

#[test]
fn oversized_event_data_is_rejected() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let data = vec![0u8; MAX_EVENT_DATA_SIZE + 1];
    assert!(engine.notify(SystemEventKind::Log, user("alice"), data).is_err());
    assert!(engine.events().is_empty());
}

#[test]
fn escrow_below_the_fee_floor_is_rejected() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.settings.min_gas_fee = 5;
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    let args = vec![
        VmObject::Address(payer),
        VmObject::Address(user("miner")),
        VmObject::number(1),
        VmObject::number(100),
    ];
    let result = engine.call_context("gas", "allowGas", args);

    assert!(matches!(result, Err(RuntimeError::Assertion(msg)) if msg == "expected call success"));
    assert!(engine
        .events()
        .iter()
        .all(|event| event.kind != EventKind::Known(SystemEventKind::GasEscrow)));
}

#[test]
fn block_events_enter_block_operation_mode() {
    let validator = user("validator");
    let mut fixture = Fixture::new().signed_by(&[validator]);
    let mut engine = fixture.engine(vec![0x00]);
    engine.consume_gas(30).unwrap();

    engine
        .call_context("block", "openBlock", vec![VmObject::Address(validator)])
        .unwrap();

    assert!(engine.is_block_operation());
    assert_eq!(engine.gas().used(), 0);
    engine.consume_gas(1_000_000).unwrap();
    assert_eq!(engine.gas().used(), 0);
    assert!(matches!(
        engine.load_context("gas"),
        Err(RuntimeError::Dispatch(_))
    ));
    let last = engine.events().last().expect("block event");
    assert_eq!(last.kind, EventKind::Known(SystemEventKind::BlockCreate));
    assert_eq!(last.contract, "block");
}

#[test]
fn scripts_raise_events_through_interop() {
    let mut fixture = Fixture::pre_genesis();
    let target = Address::from_name("somewhere");
    let mut builder = ScriptBuilder::new();
    builder
        .emit_load(vec![0xAA, 0xBB])
        .emit_load_address(target)
        .emit_load_number(70)
        .emit_extcall("Runtime.Notify");
    let mut engine = fixture.engine(builder.build());

    assert_eq!(engine.execute(), ExecutionState::Halt);
    let event = &engine.events()[0];
    assert_eq!(event.kind, EventKind::Custom(6));
    assert_eq!(event.address, target);

    let wire = event.encode().unwrap();
    assert_eq!(wire[0], 70);
    assert_eq!(&Event::decode(&wire).unwrap(), event);
}
