// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::gateway::{self, Inbox};
use crate::sut::{ByteCodec, CodecError, LineCodec};

const WAIT: Duration = Duration::from_secs(5);

fn command(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

async fn next_observation(inbox: &mut Inbox) -> String {
    inbox
        .queue
        .poll_within(WAIT)
        .await
        .expect("no observation from SUT")
        .into_label()
}

async fn wait_for_end_of_test(inbox: &mut Inbox) {
    timeout(WAIT, inbox.end_of_test.wait_for(|flag| *flag))
        .await
        .expect("end-of-test not signalled")
        .unwrap();
}

mod spawning {
    use super::*;

    #[tokio::test]
    async fn empty_command() {
        let (handle, _inbox) = gateway::channel();
        let result = ProcessGateway::spawn(&[], LineCodec, handle).await;
        assert!(matches!(result, Err(GatewayError::EmptyCommand)));
    }

    #[tokio::test]
    async fn missing_program() {
        let (handle, _inbox) = gateway::channel();
        let result =
            ProcessGateway::spawn(&command(&["/nonexistent/torx-sut"]), LineCodec, handle).await;
        match result {
            Err(GatewayError::Spawn(msg)) => assert!(msg.contains("/nonexistent/torx-sut")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("spawned a missing program"),
        }
    }

    #[tokio::test]
    async fn running_sut_is_ready() {
        let (handle, _inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), LineCodec, handle)
            .await
            .unwrap();
        assert!(sut.is_running().await);
        sut.ready().await.unwrap();
        sut.stop().await;
    }
}

mod stimuli {
    use super::*;

    #[tokio::test]
    async fn line_stimulus_round_trips_through_cat() {
        let (handle, mut inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), LineCodec, handle)
            .await
            .unwrap();

        assert_eq!(sut.apply_stimulus("hello").await.unwrap(), "hello");
        assert_eq!(next_observation(&mut inbox).await, "hello");
        sut.stop().await;
    }

    #[tokio::test]
    async fn byte_stimulus_round_trips_through_cat() {
        let (handle, mut inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), ByteCodec::fwgc(), handle)
            .await
            .unwrap();

        // cat echoes 0x02, which decodes as an observation label.
        assert_eq!(sut.apply_stimulus("g?").await.unwrap(), "g?");
        assert_eq!(next_observation(&mut inbox).await, "eaten!");
        sut.stop().await;
    }

    #[tokio::test]
    async fn unencodable_stimulus_is_rejected() {
        let (handle, _inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), ByteCodec::fwgc(), handle)
            .await
            .unwrap();

        let err = sut.apply_stimulus("x?").await.unwrap_err();
        assert!(matches!(err, GatewayError::Encode(CodecError::UnknownLabel(_))));
        assert!(sut.is_running().await);
        sut.stop().await;
    }

    #[tokio::test]
    async fn stopped_sut_takes_no_stimuli() {
        let (handle, _inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), LineCodec, handle)
            .await
            .unwrap();
        sut.stop().await;

        assert!(!sut.is_running().await);
        assert!(matches!(
            sut.apply_stimulus("hello").await,
            Err(GatewayError::NotRunning)
        ));
        assert!(matches!(sut.ready().await, Err(GatewayError::NotRunning)));
    }
}

mod shutdown {
    use super::*;

    #[tokio::test]
    async fn stop_closes_stdin_and_ends_the_test() {
        let (handle, mut inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["cat"]), LineCodec, handle)
            .await
            .unwrap();

        sut.stop().await;
        sut.stop().await;
        wait_for_end_of_test(&mut inbox).await;
    }

    #[tokio::test]
    async fn stop_kills_a_sut_ignoring_eof() {
        let (handle, _inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(&command(&["sleep", "30"]), LineCodec, handle)
            .await
            .unwrap();

        let started = std::time::Instant::now();
        sut.stop().await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!sut.is_running().await);
    }

    #[tokio::test]
    async fn exiting_sut_ends_the_test() {
        let (handle, mut inbox) = gateway::channel();
        let sut = ProcessGateway::spawn(
            &command(&["sh", "-c", "echo done!; echo oops >&2"]),
            LineCodec,
            handle,
        )
        .await
        .unwrap();

        assert_eq!(next_observation(&mut inbox).await, "done!");
        wait_for_end_of_test(&mut inbox).await;
        sut.stop().await;
    }
}

mod stderr {
    use super::*;

    #[tokio::test]
    async fn invalid_utf8_on_stderr_keeps_the_pipe_open() {
        let (handle, mut inbox) = gateway::channel();
        let script = "trap '' PIPE; printf '\\377\\n' >&2; sleep 0.3; \
                      if printf 'after\\n' >&2; then echo alive; else echo stderr-broken; fi";
        let sut = ProcessGateway::spawn(&command(&["sh", "-c", script]), LineCodec, handle)
            .await
            .unwrap();

        assert_eq!(next_observation(&mut inbox).await, "alive");
        sut.stop().await;
    }
}

mod framing {
    use super::*;

    #[tokio::test]
    async fn byte_frames_decode_per_byte() {
        let (handle, mut inbox) = gateway::channel();
        read_observations(&b"\x01\x07\x02"[..], Arc::new(ByteCodec::fwgc()), handle.clone()).await;

        assert_eq!(inbox.queue.poll_now().unwrap().label(), "done!");
        assert_eq!(inbox.queue.poll_now().unwrap().label(), "eaten!");
        assert!(inbox.queue.poll_now().is_none());
        assert!(handle.is_end_of_test());
    }

    #[tokio::test]
    async fn line_frames_skip_blank_lines() {
        let (handle, mut inbox) = gateway::channel();
        read_observations(&b"done!\r\n\n  \nretry!"[..], Arc::new(LineCodec), handle.clone()).await;

        assert_eq!(inbox.queue.poll_now().unwrap().label(), "done!");
        assert_eq!(inbox.queue.poll_now().unwrap().label(), "retry!");
        assert!(inbox.queue.poll_now().is_none());
        assert!(handle.is_end_of_test());
    }

    #[tokio::test]
    async fn empty_output_still_ends_the_test() {
        let (handle, mut inbox) = gateway::channel();
        read_observations(&b""[..], Arc::new(LineCodec), handle).await;

        assert!(inbox.queue.poll_now().is_none());
        assert!(*inbox.end_of_test.borrow());
    }
}
