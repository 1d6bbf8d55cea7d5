use std::time::Duration;

use bytes::Bytes;
use potluck_core::hub::{Hub, HubConfig};
use potluck_sdk::objects::{Dish, Notification};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

fn start(capacity: usize) -> (Hub, watch::Sender<bool>) {
    let (hub, actor) = Hub::new(HubConfig {
        client_queue_capacity: capacity,
    });
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(actor.run(shutdown_rx));
    (hub, shutdown_tx)
}

async fn recv(rx: &mut mpsc::Receiver<Bytes>) -> Bytes {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("payload not delivered within a second")
        .expect("client closed")
}

#[tokio::test]
async fn every_client_receives_identical_payload() {
    let (hub, _shutdown) = start(16);
    let mut receivers = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::channel(16);
        handles.push(hub.register(tx));
        receivers.push(rx);
    }
    assert_eq!(hub.client_count().await, 3);

    let notification = Notification::DishAdded(Dish {
        id: Uuid::new_v4(),
        event_id: Uuid::new_v4(),
        name: "Focaccia".into(),
        description: String::new(),
        dietary_tags: vec![],
        bringer_id: None,
        is_host_dish: false,
        is_requested: false,
        is_suggested: false,
    });
    hub.notify(&notification).unwrap();

    let expected = Bytes::from(notification.encode().unwrap());
    for rx in &mut receivers {
        assert_eq!(recv(rx).await, expected);
    }

    let value: serde_json::Value = serde_json::from_slice(&expected).unwrap();
    assert_eq!(value["type"], "dish_added");
    assert_eq!(value["data"]["name"], "Focaccia");
}

#[tokio::test]
async fn stalled_client_is_dropped_without_delaying_others() {
    let (hub, _shutdown) = start(2);

    // Never read. The writer parks on the second payload and the queue
    // fills up behind it.
    let (stalled_tx, _stalled_rx) = mpsc::channel::<Bytes>(1);
    let mut stalled = hub.register(stalled_tx);

    let mut fast = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..2 {
        let (tx, rx) = mpsc::channel(64);
        handles.push(hub.register(tx));
        fast.push(rx);
    }

    for i in 0..20u32 {
        hub.broadcast(format!("message {i}"));
        for rx in &mut fast {
            assert_eq!(recv(rx).await, Bytes::from(format!("message {i}")));
        }
    }

    tokio::time::timeout(Duration::from_secs(1), stalled.closed())
        .await
        .expect("stalled client was not dropped");
    assert_eq!(hub.client_count().await, 2);
}

#[tokio::test]
async fn departed_client_does_not_affect_others() {
    let (hub, _shutdown) = start(8);
    let (gone_tx, gone_rx) = mpsc::channel::<Bytes>(8);
    let mut gone = hub.register(gone_tx);
    let (tx, mut rx) = mpsc::channel(8);
    let _stays = hub.register(tx);

    drop(gone_rx);
    hub.broadcast("first");
    assert_eq!(recv(&mut rx).await, Bytes::from_static(b"first"));
    tokio::time::timeout(Duration::from_secs(1), gone.closed())
        .await
        .unwrap();

    hub.broadcast("second");
    assert_eq!(recv(&mut rx).await, Bytes::from_static(b"second"));
    assert_eq!(hub.client_count().await, 1);
}
