//! Bot protocol against real HTTP bots served by actix-web.

mod support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use parking_lot::Mutex;
use pong_engine::domain::rules::{PADDLE_HEIGHT, PADDLE_STEP};
use pong_engine::domain::BotBinding;
use pong_engine::{
    collect_moves, BotClient, BotError, BotView, EngineConfig, HttpBotClient, Move, Role,
};
use serde_json::{json, Value};
use support::{engine, participant};

type Seen = web::Data<Mutex<Vec<Value>>>;

async fn up(seen: Seen, body: web::Json<Value>) -> HttpResponse {
    seen.lock().push(body.into_inner());
    HttpResponse::Ok().json(json!({ "event": 1 }))
}

/// Chases the ball with the paddle's middle.
async fn tracker(view: web::Json<BotView>) -> HttpResponse {
    let middle = view.paddle.y - PADDLE_HEIGHT / 2;
    HttpResponse::Ok().json(json!({ "event": (view.ball_pos.y - middle).signum() }))
}

async fn out_of_range() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "event": 5 }))
}

async fn not_a_decision() -> HttpResponse {
    HttpResponse::Ok().body("move up please")
}

async fn broken() -> HttpResponse {
    HttpResponse::InternalServerError().finish()
}

async fn sleepy() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(3)).await;
    HttpResponse::Ok().json(json!({ "event": 1 }))
}

struct BotServer {
    addr: SocketAddr,
    seen: Seen,
}

impl BotServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

fn spawn_bots() -> BotServer {
    let seen: Seen = web::Data::new(Mutex::new(Vec::new()));
    let data = seen.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/up", web::post().to(up))
            .route("/tracker", web::post().to(tracker))
            .route("/out-of-range", web::post().to(out_of_range))
            .route("/not-a-decision", web::post().to(not_a_decision))
            .route("/broken", web::post().to(broken))
            .route("/sleepy", web::post().to(sleepy))
    })
    .workers(2)
    .bind(("127.0.0.1", 0))
    .expect("bind bot server");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    BotServer { addr, seen }
}

fn binding(url: String) -> BotBinding {
    BotBinding {
        participant_id: participant("alice"),
        callback_url: url,
    }
}

fn sample_view() -> BotView {
    BotView {
        paddle: pong_engine::domain::Vec2::new(16, 280),
        ball_pos: pong_engine::domain::Vec2::new(400, 240),
        ball_vel: pong_engine::domain::Vec2::new(-8, 2),
    }
}

#[actix_web::test]
async fn bot_receives_the_restricted_view() {
    let bots = spawn_bots();
    let client = HttpBotClient::new(Duration::from_secs(2)).unwrap();

    let mv = client
        .request_move(&binding(bots.url("/up")), &sample_view())
        .await
        .unwrap();

    assert_eq!(mv, Move::Up);
    let seen = bots.seen.lock();
    assert_eq!(
        seen.as_slice(),
        &[json!({ "paddle": [16, 280], "ballPos": [400, 240], "ballVel": [-8, 2] })]
    );
}

#[actix_web::test]
async fn bad_replies_are_classified() {
    let bots = spawn_bots();
    let client = HttpBotClient::new(Duration::from_secs(2)).unwrap();
    let view = sample_view();

    let err = client
        .request_move(&binding(bots.url("/out-of-range")), &view)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::OutOfRange(5)), "{err}");

    let err = client
        .request_move(&binding(bots.url("/not-a-decision")), &view)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Malformed(_)), "{err}");

    let err = client
        .request_move(&binding(bots.url("/broken")), &view)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Status(500)), "{err}");

    let err = client
        .request_move(&binding(bots.url("/missing")), &view)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Status(404)), "{err}");
}

#[actix_web::test]
async fn slow_bot_is_abandoned_at_the_deadline() {
    let bots = spawn_bots();
    let config = EngineConfig::default().with_bot_timeout(Duration::from_millis(200));
    let client = HttpBotClient::new(Duration::from_secs(10)).unwrap();

    let engine = engine(Arc::new(HttpBotClient::new(config.bot_timeout).unwrap()), config);
    let game = engine
        .lifecycle
        .create_game(&participant("alice"), Role::Left, &bots.url("/sleepy"))
        .await
        .unwrap();
    engine
        .lifecycle
        .join_game(&game.game_id, &participant("bob"), Role::Right, &bots.url("/up"))
        .await
        .unwrap();
    let started = engine.lifecycle.start_game(&game.game_id).await.unwrap();

    // The per-query deadline applies even when the client itself would wait longer
    let begun = std::time::Instant::now();
    let moves = collect_moves(&client, &started, Duration::from_millis(200)).await;
    assert!(begun.elapsed() < Duration::from_secs(2));
    assert_eq!(moves.get(&Role::Left), Some(&Move::None));
    assert_eq!(moves.get(&Role::Right), Some(&Move::Up));

    let report = engine.orchestrator.run_pass().await.unwrap();
    assert_eq!(report.ticked, 1);
    let after = engine.lifecycle.load_game(&game.game_id).await.unwrap();
    assert_eq!(after.paddle(Role::Left), started.paddle(Role::Left));
    assert_eq!(
        after.paddle(Role::Right).y,
        started.paddle(Role::Right).y + PADDLE_STEP
    );
}

#[actix_web::test]
async fn tracking_bots_play_a_rally() {
    let bots = spawn_bots();
    let config = EngineConfig::default().with_bot_timeout(Duration::from_secs(1));
    let engine = engine(Arc::new(HttpBotClient::new(config.bot_timeout).unwrap()), config);

    let game = engine
        .lifecycle
        .create_game(&participant("alice"), Role::Left, &bots.url("/tracker"))
        .await
        .unwrap();
    engine
        .lifecycle
        .join_game(&game.game_id, &participant("bob"), Role::Right, &bots.url("/tracker"))
        .await
        .unwrap();
    engine.lifecycle.start_game(&game.game_id).await.unwrap();

    for _ in 0..60 {
        engine.orchestrator.run_pass().await.unwrap();
    }

    let after = engine.lifecycle.load_game(&game.game_id).await.unwrap();
    assert_eq!(after.tick, 60);
    assert_eq!(after.version, game.version + 2 + 60);
    after.validate().unwrap();
}
