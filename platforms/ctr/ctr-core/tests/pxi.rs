use ctr_core::{
    config::{Mapping, PxiConfiguration},
    pxi::{sim::SimBlock, Cnt, Reg},
    FifoError, Pxi, SharedPxi,
};

fn trace_init() {
    let _res = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .without_time()
        .try_init();
}

#[test]
fn push_until_full() {
    trace_init();
    let sim = SimBlock::new();
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    pxi.set_enabled(true);
    assert_eq!(pxi.push(0xDEAD_BEEF), Ok(()));
    assert_eq!(sim.read(Reg::Send), 0xDEAD_BEEF);

    sim.set_cnt(sim.cnt().with(Cnt::SEND_FULL, true));
    assert_eq!(pxi.push(0x1), Err(FifoError::SendFull));
    assert_eq!(sim.read(Reg::Send), 0xDEAD_BEEF);
    assert!(pxi.enabled());
}

#[test]
fn pop_available_word() {
    trace_init();
    let sim = SimBlock::new();
    sim.write(Reg::Recv, 0x42);
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    assert!(!pxi.receive_empty_status());
    assert_eq!(pxi.pop(), Ok(0x42));

    sim.set_cnt(sim.cnt().with(Cnt::RECV_EMPTY, true));
    assert_eq!(pxi.pop(), Err(FifoError::ReceiveEmpty));
}

#[test]
fn push_and_pop_never_touch_the_error_latch() {
    trace_init();
    let sim = SimBlock::with_cnt(
        Cnt::new()
            .with(Cnt::ENABLE, true)
            .with(Cnt::SEND_FULL, true)
            .with(Cnt::RECV_EMPTY, true),
    );
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    assert!(pxi.push(1).is_err());
    assert!(pxi.pop().is_err());
    assert!(!pxi.error());

    sim.set_cnt(sim.cnt().with(Cnt::ERROR_ACK, true));
    sim.set_cnt(sim.cnt().with(Cnt::SEND_FULL, false));
    assert!(pxi.push(1).is_ok());
    assert!(pxi.error(), "latch is only cleared by an explicit acknowledge");
}

#[test]
fn push_from_stops_at_full() {
    trace_init();
    let sim = SimBlock::with_cnt(Cnt::new().with(Cnt::SEND_FULL, true));
    let mut pxi = unsafe { Pxi::new(sim.base()) };
    assert_eq!(pxi.push_from(&[1, 2, 3]), 0);
    assert_eq!(sim.read(Reg::Send), 0);

    sim.set_cnt(sim.cnt().with(Cnt::SEND_FULL, false));
    // the simulated FIFO never fills, so everything goes through and the
    // last word written is the one left in the port
    assert_eq!(pxi.push_from(&[1, 2, 3]), 3);
    assert_eq!(sim.read(Reg::Send), 3);
    assert_eq!(pxi.push_from(&[]), 0);
}

#[test]
fn drain_into_stops_at_empty_or_full_buffer() {
    trace_init();
    let sim = SimBlock::new();
    sim.write(Reg::Recv, 0xABCD);
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    let mut buf = [0u32; 4];
    assert_eq!(pxi.drain_into(&mut buf), 4);
    assert_eq!(buf, [0xABCD; 4]);

    sim.set_cnt(sim.cnt().with(Cnt::RECV_EMPTY, true));
    let mut buf = [7u32; 4];
    assert_eq!(pxi.drain_into(&mut buf), 0);
    assert_eq!(buf, [7; 4]);
}

#[test]
fn configure_applies_every_field() {
    trace_init();
    let sim = SimBlock::new();
    // something in the upper half-word that must survive
    sim.write(Reg::Cnt, 0xA5A5_0000 | (1 << 0) | (1 << 8));
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    pxi.configure(&PxiConfiguration {
        mapping: Mapping::Arm9,
        enabled: true,
        send_empty_irq: false,
        receive_not_empty_irq: true,
        flush_on_init: true,
    });

    let cnt = sim.cnt();
    assert!(cnt.get(Cnt::ENABLE));
    assert!(cnt.get(Cnt::RECV_NOT_EMPTY_IRQ));
    assert!(!cnt.get(Cnt::SEND_EMPTY_IRQ));
    assert!(cnt.get(Cnt::SEND_CLEAR));
    assert!(cnt.get(Cnt::SEND_EMPTY));
    assert!(cnt.get(Cnt::RECV_EMPTY));
    assert_eq!(cnt.bits() & 0xFFFF_0000, 0xA5A5_0000);
    // configuring does not move the driver
    assert_eq!(pxi.base(), sim.base());
}

#[test]
fn configure_default_only_enables() {
    trace_init();
    let sim = SimBlock::with_cnt(Cnt::new().with(Cnt::SEND_EMPTY_IRQ, true));
    let mut pxi = unsafe { Pxi::new(sim.base()) };

    pxi.configure(&PxiConfiguration::default());
    assert_eq!(sim.cnt(), Cnt::new().with(Cnt::ENABLE, true));
}

#[test]
fn shared_before_and_after_install() {
    trace_init();
    let first = SimBlock::new();
    let second = SimBlock::new();
    let shared = SharedPxi::new();

    assert_eq!(shared.base(), None);
    assert_eq!(shared.with(|pxi| pxi.push(1)), None);
    assert_eq!(first.read(Reg::Send), 0);

    assert!(shared.install(unsafe { Pxi::new(first.base()) }).is_none());
    assert_eq!(shared.base(), Some(first.base()));
    assert_eq!(shared.with(|pxi| pxi.push(1)), Some(Ok(())));
    assert_eq!(first.read(Reg::Send), 1);

    let prev = shared
        .install(unsafe { Pxi::new(second.base()) })
        .expect("first driver should be handed back");
    assert_eq!(prev.base(), first.base());
    shared.with(|pxi| pxi.set_receive_not_empty_irq(true));
    assert!(second.cnt().get(Cnt::RECV_NOT_EMPTY_IRQ));
    assert!(!first.cnt().get(Cnt::RECV_NOT_EMPTY_IRQ));

    let taken = shared.take().expect("second driver is installed");
    assert_eq!(taken.base(), second.base());
    assert_eq!(shared.base(), None);
}

#[test]
fn shared_from_a_static() {
    static PXI: SharedPxi = SharedPxi::new();
    // leaked so the block outlives the static's driver
    let sim: &'static SimBlock = Box::leak(Box::new(SimBlock::new()));
    sim.write(Reg::Recv, 0x1234);

    PXI.install(unsafe { Pxi::new(sim.base()) });
    let got = std::thread::spawn(|| PXI.with(|pxi| pxi.pop()))
        .join()
        .unwrap();
    assert_eq!(got, Some(Ok(0x1234)));
}
