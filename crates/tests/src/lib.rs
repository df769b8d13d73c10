//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! `build.rs` 对 `contracts/` 下的描述文件运行生成器，生成的 trait、
//! emitter、dispatcher 在此处 `include!`，测试覆盖：
//! - 生成代码的 payload 形状 (method id、判别字段、ordinal 编码)
//! - 弱引用接收者、合约不匹配、merge、registry 查找
//! - 跨线程 QueuedPipe 与 UDP DatagramPipe 端到端

contracts::channel_enum! {
    /// Time unit, declaration order fixes the ordinals
    pub enum TimeUnit {
        Nanoseconds,
        Microseconds,
        Milliseconds,
        Seconds,
        Minutes,
        Hours,
        Days,
    }
}

include!(concat!(env!("OUT_DIR"), "/channels.rs"));

#[cfg(test)]
mod channel_tests {
    use std::sync::{Arc, Mutex};

    use contracts::{sink_fn, DecodeError, DispatchTarget, Payload, Sink, Value, ValueError};
    use dispatcher::{merge, AdapterRegistry, LookupError, QueuedPipe};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Receiver recording every call as text
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Foo for Recorder {
        fn extends_test(&self, value: String) {
            self.record(format!("extendsTest({value})"));
        }
    }

    impl Bar for Recorder {
        fn no_param(&self) {
            self.record("noParam()".into());
        }

        fn byte_param(&self, a_byte: i8) {
            self.record(format!("byteParam({a_byte})"));
        }

        fn short_param(&self, a_short: i16) {
            self.record(format!("shortParam({a_short})"));
        }

        fn int_param(&self, a_int: i32) {
            self.record(format!("intParam({a_int})"));
        }

        fn long_param(&self, a_long: i64) {
            self.record(format!("longParam({a_long})"));
        }

        fn string_param(&self, a_string: String) {
            self.record(format!("stringParam({a_string})"));
        }

        fn float_param(&self, a_float: f32) {
            self.record(format!("floatParam({a_float})"));
        }

        fn double_param(&self, a_double: f64) {
            self.record(format!("doubleParam({a_double})"));
        }

        fn enum_param(&self, a_enum1: TimeUnit, a_enum2: TimeUnit) {
            self.record(format!("enumParam({a_enum1:?}, {a_enum2:?})"));
        }

        #[allow(clippy::too_many_arguments)]
        fn many_param(
            &self,
            a_byte: i8,
            a_short: i16,
            a_int: i32,
            a_long: i64,
            a_float: f32,
            a_double: f64,
            a_string: String,
            a_enum1: TimeUnit,
            a_enum2: TimeUnit,
        ) {
            self.record(format!(
                "manyParam({a_byte}, {a_short}, {a_int}, {a_long}, {a_float}, {a_double}, \
                 {a_string}, {a_enum1:?}, {a_enum2:?})"
            ));
        }
    }

    impl Bird for Recorder {
        fn fly(&self, high: i32, speed: i32) {
            self.record(format!("fly({high}, {speed})"));
        }
    }

    impl Duck for Recorder {
        fn eat(&self) {
            self.record("eat()".into());
        }

        fn quack(&self, voice: i32) {
            self.record(format!("quack({voice})"));
        }

        fn swing(&self, speed: i32, style: Option<String>) {
            self.record(format!("swing({speed}, {style:?})"));
        }
    }

    impl Base for Recorder {
        fn ping(&self, seq: i64) {
            self.record(format!("ping({seq})"));
        }
    }

    impl Left for Recorder {
        fn left(&self) {
            self.record("left()".into());
        }
    }

    impl Right for Recorder {
        fn right(&self) {
            self.record("right()".into());
        }
    }

    impl Diamond for Recorder {
        fn own(&self) {
            self.record("own()".into());
        }
    }

    /// Sink collecting payloads in memory
    fn collecting_sink() -> (Box<dyn Sink>, Arc<Mutex<Vec<Payload>>>) {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&collected);
        let sink: Box<dyn Sink> = Box::new(sink_fn(move |payload| {
            store.lock().unwrap().push(payload);
        }));
        (sink, collected)
    }

    fn take(collected: &Arc<Mutex<Vec<Payload>>>) -> Vec<Payload> {
        std::mem::take(&mut *collected.lock().unwrap())
    }

    #[test]
    fn test_string_param_round_trip() {
        let (sink, collected) = collecting_sink();
        let emitter = BarEmitter::new(sink);
        emitter.string_param("Hello".to_string());

        let payloads = take(&collected);
        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(payload.class_name(), Some("demo.Bar"));
        assert_eq!(payload.method_id(), Ok(Some(7)));
        assert_eq!(payload.get("aString"), Some(&Value::String("Hello".into())));
        assert_eq!(payload.len(), 3);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Bar> = recorder.clone();
        let dispatcher = BarDispatcher::new(&receiver);

        assert!(dispatcher.matches(payload));
        assert_eq!(dispatcher.dispatch(payload), Ok(true));
        assert_eq!(recorder.calls(), vec!["stringParam(Hello)"]);
        assert_eq!(dispatcher.metrics().delivered(), 1);
    }

    #[test]
    fn test_every_bar_method_round_trips() {
        let (sink, collected) = collecting_sink();
        let emitter = BarEmitter::new(sink);

        emitter.extends_test("base".to_string());
        emitter.no_param();
        emitter.byte_param(-8);
        emitter.short_param(1600);
        emitter.int_param(-32);
        emitter.long_param(1 << 40);
        emitter.string_param("s".to_string());
        emitter.float_param(1.5);
        emitter.double_param(-2.25);
        emitter.enum_param(TimeUnit::Seconds, TimeUnit::Minutes);
        emitter.many_param(
            1,
            2,
            3,
            4,
            5.5,
            6.5,
            "seven".to_string(),
            TimeUnit::Hours,
            TimeUnit::Days,
        );

        let payloads = take(&collected);
        let ids: Vec<_> = payloads
            .iter()
            .map(|p| p.method_id().unwrap().unwrap())
            .collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Bar> = recorder.clone();
        let dispatcher = BarDispatcher::new(&receiver);
        for payload in &payloads {
            assert_eq!(dispatcher.dispatch(payload), Ok(true));
        }

        assert_eq!(
            recorder.calls(),
            vec![
                "extendsTest(base)",
                "noParam()",
                "byteParam(-8)",
                "shortParam(1600)",
                "intParam(-32)",
                "longParam(1099511627776)",
                "stringParam(s)",
                "floatParam(1.5)",
                "doubleParam(-2.25)",
                "enumParam(Seconds, Minutes)",
                "manyParam(1, 2, 3, 4, 5.5, 6.5, seven, Hours, Days)",
            ]
        );
    }

    #[test]
    fn test_enum_marshaling() {
        let (sink, collected) = collecting_sink();
        BarEmitter::new(sink).enum_param(TimeUnit::Seconds, TimeUnit::Minutes);

        let payload = take(&collected).remove(0);
        assert_eq!(payload.method_id(), Ok(Some(10)));
        assert_eq!(payload.get("aEnum1"), Some(&Value::Enum("Seconds".into())));
        assert_eq!(payload.get("aEnum2"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_inherited_method_through_parent_trait() {
        let (sink, collected) = collecting_sink();
        let emitter = BarEmitter::new(sink);
        let as_foo: &dyn Foo = &emitter;
        as_foo.extends_test("v".to_string());

        let payload = take(&collected).remove(0);
        assert_eq!(payload.class_name(), Some("demo.Bar"));
        assert_eq!(payload.method_id(), Ok(Some(1)));

        // The same call through FooEmitter carries Foo's own name
        let (sink, collected) = collecting_sink();
        FooEmitter::new(sink).extends_test("v".to_string());
        let payload = take(&collected).remove(0);
        assert_eq!(payload.class_name(), Some("demo.Foo"));
        assert_eq!(payload.method_id(), Ok(Some(1)));
    }

    #[test]
    fn test_expired_receiver() {
        let (sink, collected) = collecting_sink();
        BarEmitter::new(sink).no_param();
        let payload = take(&collected).remove(0);

        let receiver: Arc<dyn Bar> = Arc::new(Recorder::default());
        let dispatcher = BarDispatcher::new(&receiver);
        assert!(dispatcher.is_alive());
        drop(receiver);

        assert!(!dispatcher.is_alive());
        assert!(dispatcher.matches(&payload));
        assert_eq!(dispatcher.dispatch(&payload), Ok(false));
        assert_eq!(dispatcher.metrics().expired(), 1);
    }

    #[test]
    fn test_foreign_contract_not_consumed() {
        let (sink, collected) = collecting_sink();
        DuckEmitter::new(sink).quack(3);
        let payload = take(&collected).remove(0);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Bar> = recorder.clone();
        let dispatcher = BarDispatcher::new(&receiver);

        assert!(!dispatcher.matches(&payload));
        assert_eq!(dispatcher.dispatch(&payload), Ok(false));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_unknown_method_id() {
        let mut payload = Payload::new();
        payload.set_discriminators("demo.Bar", 12);

        let receiver: Arc<dyn Bar> = Arc::new(Recorder::default());
        let dispatcher = BarDispatcher::new(&receiver);
        assert_eq!(dispatcher.dispatch(&payload), Ok(false));
        assert_eq!(dispatcher.metrics().unmatched(), 1);
    }

    #[test]
    fn test_malformed_parameter() {
        let mut payload = Payload::new();
        payload.set_discriminators("demo.Bar", 3);
        payload.insert("aByte", Value::Int(3));

        let receiver: Arc<dyn Bar> = Arc::new(Recorder::default());
        let dispatcher = BarDispatcher::new(&receiver);
        assert_eq!(
            dispatcher.dispatch(&payload),
            Err(DecodeError::invalid_value(
                "aByte",
                ValueError::wrong_type("byte", "int")
            ))
        );
        assert_eq!(dispatcher.metrics().faults(), 1);
    }

    #[test]
    fn test_optional_parameter() {
        let (sink, collected) = collecting_sink();
        let emitter = DuckEmitter::new(sink);
        emitter.swing(2, None);
        emitter.swing(3, Some("crawl".to_string()));

        let mut payloads = take(&collected);
        assert_eq!(payloads[0].get("style"), Some(&Value::Null));

        // A sender may leave the optional key out entirely
        let mut bare = Payload::new();
        bare.set_discriminators("demo.Duck", payloads[0].method_id().unwrap().unwrap());
        bare.encode("speed", 1i32);
        payloads.push(bare);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Duck> = recorder.clone();
        let dispatcher = DuckDispatcher::new(&receiver);
        for payload in &payloads {
            assert_eq!(dispatcher.dispatch(payload), Ok(true));
        }
        assert_eq!(
            recorder.calls(),
            vec![
                "swing(2, None)",
                "swing(3, Some(\"crawl\"))",
                "swing(1, None)",
            ]
        );
    }

    #[test]
    fn test_diamond_ids() {
        let (sink, collected) = collecting_sink();
        let emitter = DiamondEmitter::new(sink);
        emitter.ping(9);
        emitter.left();
        emitter.right();
        emitter.own();

        let ids: Vec<_> = take(&collected)
            .iter()
            .map(|p| p.method_id().unwrap().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);

        // The second occurrence of ping still invokes ping
        let mut second = Payload::new();
        second.set_discriminators("demo.Diamond", 3);
        second.encode("seq", 10i64);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Diamond> = recorder.clone();
        let dispatcher = DiamondDispatcher::new(&receiver);
        assert_eq!(dispatcher.dispatch(&second), Ok(true));
        assert_eq!(recorder.calls(), vec!["ping(10)"]);

        let methods: Vec<_> = dispatcher.table().methods().collect();
        assert_eq!(
            methods,
            vec![(1, "ping"), (2, "left"), (3, "ping"), (4, "right"), (5, "own")]
        );
    }

    #[test]
    fn test_merge_routes_by_contract() {
        let recorder = Arc::new(Recorder::default());
        let bar: Arc<dyn Bar> = recorder.clone();
        let duck: Arc<dyn Duck> = recorder.clone();

        let merged = merge(
            Box::new(BarDispatcher::new(&bar)),
            [Box::new(DuckDispatcher::new(&duck)) as Box<dyn DispatchTarget>],
        );

        let (sink, collected) = collecting_sink();
        BarEmitter::new(sink).int_param(1);
        let (sink, duck_collected) = collecting_sink();
        DuckEmitter::new(sink).eat();
        let (sink, foo_collected) = collecting_sink();
        FooEmitter::new(sink).extends_test("x".to_string());

        assert_eq!(merged.dispatch(&take(&collected)[0]), Ok(true));
        assert_eq!(merged.dispatch(&take(&duck_collected)[0]), Ok(true));

        let foreign = take(&foo_collected).remove(0);
        assert!(!merged.matches(&foreign));
        assert_eq!(merged.dispatch(&foreign), Ok(false));

        assert_eq!(recorder.calls(), vec!["intParam(1)", "eat()"]);
    }

    #[test]
    fn test_merge_first_consumer_wins() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let first_bar: Arc<dyn Bar> = first.clone();
        let second_bar: Arc<dyn Bar> = second.clone();

        let merged = merge(
            Box::new(BarDispatcher::new(&first_bar)),
            [Box::new(BarDispatcher::new(&second_bar)) as Box<dyn DispatchTarget>],
        );

        let (sink, collected) = collecting_sink();
        BarEmitter::new(sink).no_param();
        let payload = take(&collected).remove(0);

        assert_eq!(merged.dispatch(&payload), Ok(true));
        assert_eq!(first.calls(), vec!["noParam()"]);
        assert!(second.calls().is_empty());

        // Once the first receiver is gone the next member takes over
        drop(first_bar);
        drop(first);
        assert_eq!(merged.dispatch(&payload), Ok(true));
        assert_eq!(second.calls(), vec!["noParam()"]);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = AdapterRegistry::new();
        register_adapters(&mut registry).unwrap();

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![
                "demo.Bar",
                "demo.Base",
                "demo.Bird",
                "demo.Diamond",
                "demo.Duck",
                "demo.Foo",
                "demo.Left",
                "demo.Right",
            ]
        );

        let (sink, collected) = collecting_sink();
        let emitter = registry.new_emitter::<dyn Duck>("demo.Duck", sink).unwrap();
        emitter.fly(10, 20);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Duck> = recorder.clone();
        let dispatcher = registry
            .new_dispatcher::<dyn Duck>("demo.Duck", &receiver)
            .unwrap();
        assert_eq!(dispatcher.dispatch(&take(&collected)[0]), Ok(true));
        assert_eq!(recorder.calls(), vec!["fly(10, 20)"]);

        let bar: Arc<dyn Bar> = Arc::new(Recorder::default());
        assert!(matches!(
            registry.new_dispatcher::<dyn Bar>("demo.Duck", &bar),
            Err(LookupError::ArgumentMismatch { .. })
        ));
        assert!(matches!(
            registry.new_dispatcher::<dyn Bar>("demo.Missing", &bar),
            Err(LookupError::NotRegistered { .. })
        ));
        assert!(matches!(
            register_adapters(&mut registry),
            Err(LookupError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn test_typed_helpers() {
        let (sink, collected) = collecting_sink();
        let emitter = dispatcher::new_emitter::<dyn Bar>(sink);
        emitter.long_param(5);

        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Bar> = recorder.clone();
        let dispatcher = dispatcher::new_dispatcher::<dyn Bar>(&receiver);
        assert_eq!(dispatcher.contract(), "demo.Bar");
        assert_eq!(dispatcher.dispatch(&take(&collected)[0]), Ok(true));
        assert_eq!(recorder.calls(), vec!["longParam(5)"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queued_pipe_across_threads() {
        let recorder = Arc::new(Recorder::default());
        let receiver: Arc<dyn Bar> = recorder.clone();
        let pipe = QueuedPipe::spawn("bar", BarDispatcher::new(&receiver), 64);

        let emitter = BarEmitter::new(Box::new(pipe.sink()));
        let sender = std::thread::spawn(move || {
            for i in 0..10 {
                emitter.int_param(i);
            }
        });
        sender.join().unwrap();

        pipe.shutdown().await;

        let expected: Vec<String> = (0..10).map(|i| format!("intParam({i})")).collect();
        assert_eq!(recorder.calls(), expected);
    }

    #[tokio::test]
    async fn test_datagram_pipe_end_to_end() {
        use dispatcher::{DatagramConfig, DatagramReceiver, DatagramSink, WireFormat};
        use tokio::time::{sleep, Duration};

        let receiver = DatagramReceiver::bind(
            "udp-in",
            "127.0.0.1:0".parse().unwrap(),
            WireFormat::Bincode,
        )
        .await
        .unwrap();
        let addr = receiver.local_addr().unwrap();

        let recorder = Arc::new(Recorder::default());
        let bar: Arc<dyn Bar> = recorder.clone();
        let handle = receiver.spawn(BarDispatcher::new(&bar));

        let sink = DatagramSink::connect("udp-out", DatagramConfig::new(addr, WireFormat::Bincode))
            .unwrap();
        BarEmitter::new(Box::new(sink)).string_param("Hello".to_string());

        for _ in 0..100 {
            if !recorder.calls().is_empty() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(recorder.calls(), vec!["stringParam(Hello)"]);
    }
}
