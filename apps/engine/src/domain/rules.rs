//! Fixed Pong rules and playfield geometry.
//!
//! All distances are integer pixels, all speeds are pixels per tick.
//! Origin is the bottom-left corner of the field; `Up` moves toward `+y`.

/// Game type segment used in store keys.
pub const GAME_TYPE: &str = "pong";

/// Playfield width
pub const WIDTH: i32 = 800;

/// Playfield height
pub const HEIGHT: i32 = 480;

pub const PADDLE_WIDTH: i32 = 10;
pub const PADDLE_HEIGHT: i32 = 80;

/// Gap between a paddle and its goal line
pub const PADDLE_MARGIN: i32 = 16;

/// Distance a paddle travels for one `Up`/`Down` move
pub const PADDLE_STEP: i32 = 20;

pub const BALL_RADIUS: i32 = 6;

/// Horizontal speed of every serve
pub const SERVE_SPEED_X: i32 = 8;

/// Largest vertical speed a serve may start with
pub const MAX_SERVE_SPEED_Y: i32 = 6;

/// Horizontal speed gained on every paddle hit
pub const SPEED_INCREMENT: i32 = 1;

/// Vertical speed added at the very edge of a paddle
pub const MAX_ENGLISH: i32 = 8;

pub const MAX_BALL_SPEED_X: i32 = 24;
pub const MAX_BALL_SPEED_Y: i32 = 16;

/// Points needed to win the game
pub const POINTS_TO_WIN: u32 = 11;

pub const MAX_PLAYERS: usize = 2;

/// Membership needed before a game counts as ready
pub const MIN_PLAYERS_TO_READY: usize = 2;

/// X coordinate of the left paddle's hitting face.
pub const LEFT_FACE_X: i32 = PADDLE_MARGIN + PADDLE_WIDTH;

/// X coordinate of the right paddle's hitting face.
pub const RIGHT_FACE_X: i32 = WIDTH - PADDLE_MARGIN - PADDLE_WIDTH;

/// Highest legal paddle `y` (its lower edge).
pub const PADDLE_MAX_Y: i32 = HEIGHT - PADDLE_HEIGHT;

// Max speeds must stay below the field size so a single reflection per axis
// and per tick is enough to keep the ball inside.
const _: () = assert!(MAX_BALL_SPEED_Y < HEIGHT - 2 * BALL_RADIUS);
const _: () = assert!(MAX_BALL_SPEED_X < (RIGHT_FACE_X - LEFT_FACE_X) / 2);
const _: () = assert!(MAX_SERVE_SPEED_Y <= MAX_BALL_SPEED_Y);
