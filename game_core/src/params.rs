/// Game tuning parameters for Pong
///
/// Distances are board units, speeds are units per second. At the default
/// frame rate the paddle covers 5 units per tick and a fresh serve 4.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Board
    pub const BOARD_WIDTH: f32 = 800.0;
    pub const BOARD_HEIGHT: f32 = 600.0;

    // Paddle
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const PADDLE_INSET: f32 = 20.0; // Goal line to paddle's outer face
    pub const PADDLE_SPEED: f32 = 300.0;

    // Ball
    pub const BALL_SIZE: f32 = 10.0;
    pub const BALL_SPEED_INITIAL: f32 = 240.0;
    pub const BALL_SPEED_INCREMENT: f32 = 30.0; // Added on every paddle hit
    pub const BALL_SPEED_MAX: f32 = 600.0;
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3; // 60°
    pub const SERVE_ANGLE_SPREAD: f32 = std::f32::consts::FRAC_PI_6; // 30°

    // Score
    pub const SCORE_LIMIT: u8 = 5;

    // Timing
    pub const FRAME_RATE: f32 = 60.0;
}
