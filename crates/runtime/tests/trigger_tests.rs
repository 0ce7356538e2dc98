mod common;

use common::{fuel, user, Fixture};
use nexus_config::FUEL_TOKEN_SYMBOL;
use nexus_core::{Address, EventKind, SystemEventKind};
use nexus_runtime::{
    AccountRecord, AccountRegistry, AccountTrigger, ContractInterface, ContractMethod,
    ContractRecord, ContractRegistry, RuntimeError,
};
use nexus_vm::{ExecutionState, Opcode, ScriptBuilder, VmObject, VmType};

fn failing_writer() -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder
        .emit_load(b"written".to_vec())
        .emit_load(b"flag".to_vec())
        .emit(Opcode::PUT)
        .emit_load("refused")
        .emit(Opcode::THROW);
    builder.build()
}

fn deploy(fixture: &mut Fixture, name: &str, method: &str, script: Vec<u8>) {
    let record = ContractRecord {
        name: name.to_string(),
        script,
        interface: ContractInterface::new(vec![ContractMethod::new(method, VmType::Any, 0)]),
    };
    ContractRegistry::deploy(&mut fixture.storage, &record).unwrap();
}

#[test]
fn empty_script_accepts() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    assert!(engine
        .invoke_trigger(&[], None, AccountTrigger::OnSend, vec![])
        .unwrap());
    assert_eq!(engine.gas().used(), 0);
}

#[test]
fn explicit_false_rejects() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let mut script = ScriptBuilder::new();
    script.emit_load(false);
    assert!(!engine
        .invoke_trigger(&script.build(), None, AccountTrigger::OnReceive, vec![])
        .unwrap());
}

#[test]
fn failed_trigger_writes_are_rolled_back() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let accepted = engine
        .invoke_trigger(&failing_writer(), None, AccountTrigger::OnMint, vec![])
        .unwrap();
    assert!(!accepted);
    let used = engine.gas().used();
    drop(engine);

    assert!(used > 0, "gas of a failed trigger is still charged");
    assert_eq!(fixture.storage.get(b"data.entry.flag").unwrap(), None);
    assert!(!fixture.storage.is_dirty());
}

#[test]
fn failed_contract_hook_writes_are_rolled_back() {
    let mut fixture = Fixture::new();
    deploy(&mut fixture, "hooked", "onReceive", failing_writer());
    let hooked = Address::from_name("hooked");
    let mut engine = fixture.engine(vec![0x00]);

    assert!(!engine
        .invoke_trigger_on_account(&hooked, AccountTrigger::OnReceive, vec![])
        .unwrap());
    assert_eq!(engine.current_context_name(), "entry");
    drop(engine);
    assert_eq!(fixture.storage.get(b"data.hooked.flag").unwrap(), None);

    fixture.settings.rollback_failed_triggers = false;
    let mut engine = fixture.engine(vec![0x00]);
    assert!(!engine
        .invoke_trigger_on_account(&hooked, AccountTrigger::OnReceive, vec![])
        .unwrap());
    drop(engine);
    assert_eq!(
        fixture.storage.get(b"data.hooked.flag").unwrap(),
        Some(b"written".to_vec())
    );
}

#[test]
fn triggers_run_free_during_block_operations() {
    let validator = user("validator");
    let mut fixture = Fixture::new().signed_by(&[validator]);
    let mut engine = fixture.engine(vec![0x00]);
    engine
        .call_context("block", "openBlock", vec![VmObject::Address(validator)])
        .unwrap();

    let mut script = ScriptBuilder::new();
    script.emit_load_number(1).emit(Opcode::POP);
    assert!(engine
        .invoke_trigger(&script.build(), None, AccountTrigger::OnMint, vec![])
        .unwrap());
    assert_eq!(engine.gas().used(), 0);
}

#[test]
fn legacy_mode_keeps_failed_trigger_writes() {
    let mut fixture = Fixture::new();
    fixture.settings.rollback_failed_triggers = false;
    let mut engine = fixture.engine(vec![0x00]);
    assert!(!engine
        .invoke_trigger(&failing_writer(), None, AccountTrigger::OnMint, vec![])
        .unwrap());
    drop(engine);

    assert_eq!(
        fixture.storage.get(b"data.entry.flag").unwrap(),
        Some(b"written".to_vec())
    );
}

#[test]
fn halted_trigger_events_are_spliced_in() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let mut script = ScriptBuilder::new();
    script
        .emit_load(vec![0x01])
        .emit_load_address(user("alice"))
        .emit_load_number(64)
        .emit_extcall("Runtime.Notify");

    engine
        .notify(EventKind::Custom(9), user("alice"), vec![])
        .unwrap();
    assert!(engine
        .invoke_trigger(&script.build(), None, AccountTrigger::OnSend, vec![])
        .unwrap());

    let kinds: Vec<_> = engine.events().iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![EventKind::Custom(9), EventKind::Custom(0)]);
}

#[test]
fn arguments_arrive_in_declaration_order() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    // Drops the trigger name, then accepts only when the first argument is 7.
    let mut script = ScriptBuilder::new();
    script
        .emit(Opcode::POP)
        .emit_load_number(7)
        .emit(Opcode::EQUAL);
    let script = script.build();

    assert!(engine
        .invoke_trigger(
            &script,
            None,
            AccountTrigger::OnWitness,
            vec![VmObject::number(7), VmObject::number(1)],
        )
        .unwrap());
    assert!(!engine
        .invoke_trigger(
            &script,
            None,
            AccountTrigger::OnWitness,
            vec![VmObject::number(1), VmObject::number(7)],
        )
        .unwrap());
}

#[test]
fn undeclared_trigger_accepts_without_running() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let interface = ContractInterface::new(vec![ContractMethod::new("onMint", VmType::Bool, 0)]);
    let mut script = ScriptBuilder::new();
    script.emit_load(false);

    assert!(engine
        .invoke_trigger(&script.build(), Some(&interface), AccountTrigger::OnSend, vec![])
        .unwrap());
    assert_eq!(engine.gas().used(), 0);
}

#[test]
fn account_resolution_by_address_kind() {
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);
    let trigger = AccountTrigger::OnReceive;

    assert!(!engine
        .invoke_trigger_on_account(&Address::NULL, trigger, vec![])
        .unwrap());
    assert!(engine
        .invoke_trigger_on_account(&Address::interop("eth", b"0x01"), trigger, vec![])
        .unwrap());
    assert!(engine
        .invoke_trigger_on_account(&user("nobody"), trigger, vec![])
        .unwrap());
    assert!(engine
        .invoke_trigger_on_account(&Address::from_name("gas"), trigger, vec![])
        .unwrap());
    assert!(engine
        .invoke_trigger_on_account(&Address::from_name("unknown"), trigger, vec![])
        .unwrap());
}

#[test]
fn receiving_account_can_refuse_tokens() {
    let alice = user("alice");
    let bob = user("bob");
    let mut fixture = Fixture::new().signed_by(&[alice]);
    fixture.fund(&alice, 100);
    let mut refusing = ScriptBuilder::new();
    refusing.emit_load(false);
    let record = AccountRecord {
        script: refusing.build(),
        interface: Some(ContractInterface::new(vec![ContractMethod::new(
            "onReceive",
            VmType::Bool,
            0,
        )])),
    };
    AccountRegistry::register(&mut fixture.storage, &bob, &record).unwrap();
    let mut engine = fixture.engine(vec![0x00]);

    let result = engine.transfer_tokens(FUEL_TOKEN_SYMBOL, &alice, &bob, &fuel(10));
    assert!(matches!(result, Err(RuntimeError::Assertion(_))));

    let carol = user("carol");
    engine
        .transfer_tokens(FUEL_TOKEN_SYMBOL, &alice, &carol, &fuel(10))
        .unwrap();
    assert_eq!(engine.balance_of(FUEL_TOKEN_SYMBOL, &carol).unwrap(), fuel(10));
}

#[test]
fn mint_and_burn_track_supply() {
    let dave = user("dave");
    let mut fixture = Fixture::new();
    let mut engine = fixture.engine(vec![0x00]);

    engine.mint_tokens(FUEL_TOKEN_SYMBOL, &dave, &fuel(50)).unwrap();
    engine.burn_tokens(FUEL_TOKEN_SYMBOL, &dave, &fuel(20)).unwrap();
    assert!(matches!(
        engine.burn_tokens(FUEL_TOKEN_SYMBOL, &dave, &fuel(31)),
        Err(RuntimeError::Assertion(_))
    ));

    let kinds: Vec<_> = engine.events().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Known(SystemEventKind::TokenMint),
            EventKind::Known(SystemEventKind::TokenBurn),
        ]
    );
    assert!(engine.events().iter().all(|event| event.address == dave));
    drop(engine);

    assert_eq!(fixture.balance(&dave), fuel(30));
    assert_eq!(fixture.supply(), fuel(30));
}

#[test]
fn account_can_refuse_minted_tokens() {
    let erin = user("erin");
    let mut fixture = Fixture::new();
    let mut refusing = ScriptBuilder::new();
    refusing.emit_load(false);
    AccountRegistry::register(
        &mut fixture.storage,
        &erin,
        &AccountRecord {
            script: refusing.build(),
            interface: Some(ContractInterface::new(vec![ContractMethod::new(
                "onMint",
                VmType::Bool,
                0,
            )])),
        },
    )
    .unwrap();
    let mut engine = fixture.engine(vec![0x00]);

    let result = engine.mint_tokens(FUEL_TOKEN_SYMBOL, &erin, &fuel(5));
    assert!(matches!(result, Err(RuntimeError::Assertion(_))));
    assert!(engine.events().is_empty());
}

#[test]
fn trigger_nesting_is_bounded() {
    let alice = user("alice");
    let mut fixture = Fixture::new().signed_by(&[alice]);
    fixture.settings.max_call_depth = 4;
    // Asks for its own witness, which runs this script again.
    let mut script = ScriptBuilder::new();
    script
        .emit(Opcode::POP)
        .emit_extcall("Runtime.IsWitness");
    AccountRegistry::register(
        &mut fixture.storage,
        &alice,
        &AccountRecord {
            script: script.build(),
            interface: None,
        },
    )
    .unwrap();
    let mut engine = fixture.engine(vec![0x00]);

    assert!(!engine.is_witness(&alice).unwrap());
}

#[test]
fn switches_and_triggers_share_one_depth_limit() {
    let alice = user("alice");
    let run = |max_call_depth: usize| {
        let mut fixture = Fixture::new().signed_by(&[alice]);
        fixture.settings.max_call_depth = max_call_depth;
        let mut accept = ScriptBuilder::new();
        accept.emit_load(true);
        AccountRegistry::register(
            &mut fixture.storage,
            &alice,
            &AccountRecord {
                script: accept.build(),
                interface: None,
            },
        )
        .unwrap();
        // One frame for the switch, then a witness trigger below it.
        let mut hop = ScriptBuilder::new();
        hop.emit_load_address(alice).emit_extcall("Runtime.IsWitness");
        deploy(&mut fixture, "hop", "run", hop.build());

        let mut entry = ScriptBuilder::new();
        entry.emit_context_call("hop", "run", Vec::<VmObject>::new());
        let mut engine = fixture.engine(entry.build()).with_delay_payment(true);
        let state = engine.execute();
        let depth_exceeded = matches!(engine.fault(), Some(RuntimeError::CallDepthExceeded(_)));
        (state, depth_exceeded, engine.result().cloned())
    };

    let (state, depth_exceeded, _) = run(1);
    assert_eq!(state, ExecutionState::Fault);
    assert!(depth_exceeded);

    let (state, _, result) = run(2);
    assert_eq!(state, ExecutionState::Halt);
    assert_eq!(result, Some(VmObject::Bool(true)));
}
