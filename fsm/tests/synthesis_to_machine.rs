//! Linking synthesized processes for whole protocols into machines.

use assert_matches::assert_matches;
use switchboard_compiler::synthesize;
use switchboard_fsm::{transform, ActionKind, Machine};
use switchboard_types::{Branch, GlobalType, MessageKind, ValueType};

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn machine_for(global: &GlobalType, p: &str, others: &[&str]) -> Machine {
    let process = synthesize(global, p, &ids(others)).unwrap();
    transform(p, &process).unwrap()
}

#[test]
fn looping_protocol_produces_a_cyclic_machine() {
    // rec t. c -> s { more(int). t, done. end }
    let g = GlobalType::rec(
        "t",
        GlobalType::exchange(
            "c",
            "s",
            [
                (
                    "more".to_string(),
                    Branch::new(ValueType::Int, GlobalType::call("t")),
                ),
                ("done".to_string(), Branch::unit(GlobalType::End)),
            ],
        ),
    );
    let machine = machine_for(&g, "c", &["s"]);
    let entry = machine.entry();

    assert_matches!(
        machine.action(entry),
        ActionKind::Receive { from, message: MessageKind::Label } => assert_eq!(from, "c")
    );

    // more: send label, receive the int, forward it, loop back to entry
    let send_label = machine.branch_target(entry, "more").unwrap();
    let recv_value = machine.continuation(send_label).unwrap();
    assert_matches!(
        machine.action(recv_value),
        ActionKind::Receive { message: MessageKind::Value(ValueType::Int), .. }
    );
    let send_value = machine.continuation(recv_value).unwrap();
    assert_eq!(machine.continuation(send_value), Some(entry));

    // done: send label, end
    let send_done = machine.branch_target(entry, "done").unwrap();
    let end = machine.continuation(send_done).unwrap();
    assert_eq!(machine.action(end), &ActionKind::End);
    assert_eq!(machine.out_degree(end), 0);
}

#[test]
fn bystander_machine_acts_only_on_the_login_branch() {
    // c -> s { login. s -> a: passwd(str). end, quit. end }
    let g = GlobalType::exchange(
        "c",
        "s",
        [
            (
                "login".to_string(),
                Branch::unit(GlobalType::exchange(
                    "s",
                    "a",
                    [(
                        "passwd".to_string(),
                        Branch::new(ValueType::Str, GlobalType::End),
                    )],
                )),
            ),
            ("quit".to_string(), Branch::unit(GlobalType::End)),
        ],
    );
    let machine = machine_for(&g, "a", &["c", "s"]);
    let entry = machine.entry();

    // a learns the outcome from s's router
    assert_matches!(
        machine.action(entry),
        ActionKind::Receive { from, message: MessageKind::Label } => assert_eq!(from, "s")
    );

    // quit: relay the label to the wrapped party, then nothing
    let quit_send = machine.branch_target(entry, "quit").unwrap();
    assert_matches!(machine.action(quit_send), ActionKind::Send { to, .. } => assert_eq!(to, "a"));
    let quit_end = machine.continuation(quit_send).unwrap();
    assert_eq!(machine.action(quit_end), &ActionKind::End);

    // login: relay, then the password exchange a participates in
    let login_send = machine.branch_target(entry, "login").unwrap();
    let passwd_recv = machine.continuation(login_send).unwrap();
    assert_matches!(
        machine.action(passwd_recv),
        ActionKind::Receive { from, message: MessageKind::Label } => assert_eq!(from, "s")
    );
}

#[test]
fn every_machine_has_a_single_entry_and_terminal_ends() {
    let g = GlobalType::exchange(
        "c",
        "s",
        [
            (
                "login".to_string(),
                Branch::new(
                    ValueType::Str,
                    GlobalType::exchange(
                        "s",
                        "a",
                        [(
                            "passwd".to_string(),
                            Branch::new(ValueType::Str, GlobalType::End),
                        )],
                    ),
                ),
            ),
            ("quit".to_string(), Branch::unit(GlobalType::End)),
        ],
    );
    for (p, others) in [("c", ["s", "a"]), ("s", ["c", "a"]), ("a", ["c", "s"])] {
        let machine = machine_for(&g, p, &others);
        for state in machine.states() {
            if machine.action(state) == &ActionKind::End {
                assert_eq!(machine.out_degree(state), 0, "END must be terminal for {p}");
            }
        }
    }
}
