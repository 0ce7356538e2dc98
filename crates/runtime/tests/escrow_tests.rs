mod common;

use common::{fuel, user, Fixture};
use nexus_config::GAS_BURN_FIX_VERSION;
use nexus_core::{Address, EventKind, GasEventData, SystemEventKind};
use nexus_runtime::{
    native::reward_pool_of, AccountRecord, AccountRegistry, Chain, ContractInterface,
    ContractMethod, ContractRecord, ContractRegistry, ExecutionEngine, RuntimeError,
};
use nexus_vm::{ExecutionState, ScriptBuilder, VmObject, VmType};

fn allow(engine: &mut ExecutionEngine<'_>, payer: Address, target: Address, price: u64, limit: u64) {
    engine
        .call_context(
            "gas",
            "allowGas",
            vec![
                VmObject::Address(payer),
                VmObject::Address(target),
                VmObject::number(price),
                VmObject::number(limit),
            ],
        )
        .expect("allowGas succeeds");
}

fn spend(engine: &mut ExecutionEngine<'_>, payer: Address) -> Result<(), RuntimeError> {
    engine
        .call_context("gas", "spendGas", vec![VmObject::Address(payer)])
        .map(|_| ())
}

fn allow_args(payer: Address) -> [VmObject; 4] {
    [
        VmObject::Address(payer),
        VmObject::Address(user("miner")),
        VmObject::number(1),
        VmObject::number(100),
    ]
}

/// Deploys `relay`, whose `run` method runs `build` from inside its own context.
fn deploy_relay(fixture: &mut Fixture, build: impl FnOnce(&mut ScriptBuilder)) {
    let mut builder = ScriptBuilder::new();
    build(&mut builder);
    let record = ContractRecord {
        name: "relay".to_string(),
        script: builder.build(),
        interface: ContractInterface::new(vec![ContractMethod::new("run", VmType::Any, 0)]),
    };
    ContractRegistry::deploy(&mut fixture.storage, &record).unwrap();
}

fn gas() -> Address {
    Address::from_name("gas")
}

fn validator() -> Address {
    Address::from_name("validator")
}

#[test]
fn allowance_sets_the_gas_account() {
    let payer = user("payer");
    let target = user("miner");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    allow(&mut engine, payer, target, 2, 100);

    assert_eq!(engine.gas().max(), 100);
    assert_eq!(engine.gas().price(), 2);
    assert_eq!(engine.gas().target(), target);
    let allowed = engine
        .call_context("gas", "allowedGas", vec![VmObject::Address(payer)])
        .unwrap();
    assert_eq!(allowed, Some(VmObject::number(200)));
    let escrow = engine
        .events()
        .iter()
        .find(|event| event.kind == EventKind::Known(SystemEventKind::GasEscrow))
        .expect("escrow event");
    assert_eq!(escrow.address, payer);
    assert_eq!(
        GasEventData::decode(&escrow.data).unwrap(),
        GasEventData {
            address: target,
            price: 2,
            amount: 100
        }
    );
    drop(engine);
    assert_eq!(fixture.balance(&payer), fuel(800));
    assert_eq!(fixture.balance(&gas()), fuel(200));
}

#[test]
fn settlement_burns_from_the_contract() {
    let payer = user("payer");
    let target = user("miner");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    allow(&mut engine, payer, target, 1, 100);
    engine.consume_gas(40).unwrap();
    spend(&mut engine, payer).unwrap();

    assert_eq!(engine.gas().paid(), 40);
    let payment = engine
        .events()
        .iter()
        .find(|event| event.kind == EventKind::Known(SystemEventKind::GasPayment))
        .expect("payment event");
    assert_eq!(GasEventData::decode(&payment.data).unwrap().amount, 40);
    drop(engine);

    assert_eq!(fixture.balance(&payer), fuel(960));
    assert_eq!(fixture.balance(&target), fuel(10));
    assert_eq!(fixture.balance(&validator()), fuel(10));
    assert_eq!(fixture.balance(&gas()), fuel(0));
    assert_eq!(fixture.supply(), fuel(980));

    let mut engine = fixture.engine(vec![0x00]);
    let allowed = engine
        .call_context("gas", "allowedGas", vec![VmObject::Address(payer)])
        .unwrap();
    assert_eq!(allowed, Some(VmObject::number(0)));
}

#[test]
fn chain_target_share_goes_to_the_reward_pool() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    let chain_address = fixture.chain.address();
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    allow(&mut engine, payer, chain_address, 1, 100);
    engine.consume_gas(40).unwrap();
    spend(&mut engine, payer).unwrap();
    drop(engine);

    assert_eq!(fixture.balance(&chain_address), fuel(0));
    assert_eq!(fixture.balance(&gas()), fuel(10));
    assert_eq!(reward_pool_of(&fixture.storage).unwrap(), fuel(10));
    assert_eq!(fixture.balance(&validator()), fuel(10));
}

#[test]
fn legacy_settlement_charges_the_payer() {
    let payer = user("payer");
    let target = user("miner");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.chain = fixture
        .chain
        .clone()
        .with_protocol_version(GAS_BURN_FIX_VERSION - 1);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    allow(&mut engine, payer, target, 1, 100);
    engine.consume_gas(40).unwrap();
    spend(&mut engine, payer).unwrap();
    drop(engine);

    assert_eq!(fixture.balance(&payer), fuel(920));
    assert_eq!(fixture.balance(&gas()), fuel(40));
    assert_eq!(fixture.balance(&target), fuel(10));
    assert_eq!(fixture.balance(&validator()), fuel(10));
    assert_eq!(fixture.supply(), fuel(980));
}

#[test]
fn only_one_allowance_per_payer() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    allow(&mut engine, payer, user("miner"), 1, 100);
    let again = engine.call_context(
        "gas",
        "allowGas",
        vec![
            VmObject::Address(payer),
            VmObject::Address(user("miner")),
            VmObject::number(1),
            VmObject::number(100),
        ],
    );
    assert!(again.is_err());
}

#[test]
fn allowance_requires_the_payer_witness() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[user("somebody")]);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]);

    let result = engine.call_context(
        "gas",
        "allowGas",
        vec![
            VmObject::Address(payer),
            VmObject::Address(user("miner")),
            VmObject::number(1),
            VmObject::number(100),
        ],
    );
    assert!(result.is_err());
    drop(engine);
    assert_eq!(fixture.balance(&payer), fuel(1000));
}

#[test]
fn spending_beyond_the_allowance_fails() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    let mut engine = fixture.engine(vec![0x00]).with_delay_payment(true);

    allow(&mut engine, payer, user("miner"), 1, 100);
    engine.consume_gas(150).unwrap();
    assert!(spend(&mut engine, payer).is_err());
    assert!(spend(&mut Fixture::new().engine(vec![0x00]), payer).is_err());
}

#[test]
fn script_pays_for_itself() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);

    let mut builder = ScriptBuilder::new();
    builder
        .emit_context_call(
            "gas",
            "allowGas",
            [
                VmObject::Address(payer),
                VmObject::Address(user("miner")),
                VmObject::number(1),
                VmObject::number(100),
            ],
        )
        .emit_context_call("gas", "spendGas", [VmObject::Address(payer)]);
    let mut engine = fixture.engine(builder.build());

    assert_eq!(engine.execute(), ExecutionState::Halt, "{:?}", engine.fault());
    // Six loads, CTX and SWITCH; then three loads, CTX and SWITCH.
    assert_eq!(engine.gas().used(), 27 + 21);
    assert_eq!(engine.gas().paid(), 48);
    drop(engine);
    assert_eq!(fixture.balance(&payer), fuel(1000 - 48));
}

#[test]
fn script_without_settlement_faults_as_unpaid() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);

    let mut builder = ScriptBuilder::new();
    builder.emit_context_call(
        "gas",
        "allowGas",
        [
            VmObject::Address(payer),
            VmObject::Address(user("miner")),
            VmObject::number(1),
            VmObject::number(100),
        ],
    );
    let mut engine = fixture.engine(builder.build());

    assert_eq!(engine.execute(), ExecutionState::Fault);
    assert!(matches!(engine.fault(), Some(RuntimeError::Invariant(msg)) if msg == "unpaid gas"));
}

#[test]
fn allowance_from_a_nested_context_is_rejected() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    deploy_relay(&mut fixture, |b| {
        b.emit_context_call("gas", "allowGas", allow_args(payer));
    });
    let mut entry = ScriptBuilder::new();
    entry.emit_context_call("relay", "run", Vec::<VmObject>::new());
    let mut engine = fixture.engine(entry.build()).with_delay_payment(true);

    assert_eq!(engine.execute(), ExecutionState::Fault);
    assert!(matches!(
        engine.fault(),
        Some(RuntimeError::Assertion(msg)) if msg.starts_with("allowGas must be called from the entry")
    ));
    assert_eq!(engine.gas().max(), 10_000);
    drop(engine);
    assert_eq!(fixture.balance(&payer), fuel(1000));
}

#[test]
fn settlement_from_a_nested_context_is_rejected() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    deploy_relay(&mut fixture, |b| {
        b.emit_context_call("gas", "spendGas", [VmObject::Address(payer)]);
    });
    let mut entry = ScriptBuilder::new();
    entry
        .emit_context_call("gas", "allowGas", allow_args(payer))
        .emit_context_call("relay", "run", Vec::<VmObject>::new());
    let mut engine = fixture.engine(entry.build());

    assert_eq!(engine.execute(), ExecutionState::Fault);
    assert!(matches!(
        engine.fault(),
        Some(RuntimeError::Assertion(msg)) if msg.starts_with("spendGas must be called from the entry")
    ));
    assert_eq!(engine.gas().paid(), 0);
}

#[test]
fn settlement_hooks_are_not_billed() {
    let payer = user("payer");
    let mut fixture = Fixture::new().signed_by(&[payer]);
    fixture.fund(&payer, 1000);
    // Accepts every hook, including the refund's onReceive.
    let mut hook = ScriptBuilder::new();
    hook.emit_load(true);
    AccountRegistry::register(
        &mut fixture.storage,
        &payer,
        &AccountRecord {
            script: hook.build(),
            interface: None,
        },
    )
    .unwrap();

    let mut builder = ScriptBuilder::new();
    builder
        .emit_context_call("gas", "allowGas", allow_args(payer))
        .emit_context_call("gas", "spendGas", [VmObject::Address(payer)]);
    let mut engine = fixture.engine(builder.build());

    assert_eq!(engine.execute(), ExecutionState::Halt, "{:?}", engine.fault());
    assert_eq!(engine.gas().paid(), engine.gas().used());
    let used = engine.gas().used();
    drop(engine);
    assert_eq!(fixture.balance(&payer), fuel(1000 - used));
}
