#![no_main]
use libfuzzer_sys::fuzz_target;
use sct_core::mocks::ScriptedBoard;
use sct_core::{Device, SetupPacket};

fuzz_target!(|packets: Vec<[u8; 8]>| {
    let Ok(mut dev) = Device::builder().with_board(ScriptedBoard::new(100)).try_build() else {
        return;
    };
    for raw in packets {
        let setup = SetupPacket::from_bytes(raw);
        let reply = dev.handle_setup(&setup);
        assert!(reply.len() <= usize::from(setup.length));
        dev.poll();
    }
});
