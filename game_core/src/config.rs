use crate::{Board, Params, Side};

/// Invalid tunables rejected by [`Config::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("paddle height {paddle} does not fit a board of height {board}")]
    PaddleTooTall { paddle: f32, board: f32 },
    #[error("ball speed cap {max} is below the base speed {initial}")]
    SpeedCapBelowBase { initial: f32, max: f32 },
    #[error("ball can travel {travel} units per tick, more than the {depth} unit paddle depth")]
    Tunnelling { travel: f32, depth: f32 },
    #[error("score limit must be at least 1")]
    ZeroScoreLimit,
}

/// Game configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub board_width: f32,
    pub board_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_inset: f32,
    pub paddle_speed: f32,
    pub ball_size: f32,
    pub ball_speed_initial: f32,
    pub ball_speed_increment: f32,
    pub ball_speed_max: f32,
    pub max_bounce_angle: f32,
    pub serve_angle_spread: f32,
    pub score_limit: u8,
    pub frame_rate: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_width: Params::BOARD_WIDTH,
            board_height: Params::BOARD_HEIGHT,
            paddle_width: Params::PADDLE_WIDTH,
            paddle_height: Params::PADDLE_HEIGHT,
            paddle_inset: Params::PADDLE_INSET,
            paddle_speed: Params::PADDLE_SPEED,
            ball_size: Params::BALL_SIZE,
            ball_speed_initial: Params::BALL_SPEED_INITIAL,
            ball_speed_increment: Params::BALL_SPEED_INCREMENT,
            ball_speed_max: Params::BALL_SPEED_MAX,
            max_bounce_angle: Params::MAX_BOUNCE_ANGLE,
            serve_angle_spread: Params::SERVE_ANGLE_SPREAD,
            score_limit: Params::SCORE_LIMIT,
            frame_rate: Params::FRAME_RATE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PONG_*` environment variables.
    ///
    /// Unparseable or out-of-range values are logged and ignored.
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("PONG_SCORE_LIMIT") {
            match limit.parse::<u8>() {
                Ok(parsed) if parsed > 0 => config.score_limit = parsed,
                _ => tracing::warn!("Invalid PONG_SCORE_LIMIT '{}', using default", limit),
            }
        }

        if let Some(speed) = positive_env("PONG_BALL_SPEED") {
            config.ball_speed_initial = speed;
            config.ball_speed_max = config.ball_speed_max.max(speed);
        }

        if let Some(speed) = positive_env("PONG_PADDLE_SPEED") {
            config.paddle_speed = speed;
        }

        if let Some(rate) = positive_env("PONG_FRAME_RATE") {
            config.frame_rate = rate;
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Environment produced an invalid config ({}), using defaults", e);
            return Self::default();
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("board_width", self.board_width),
            ("board_height", self.board_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_size", self.ball_size),
            ("ball_speed_initial", self.ball_speed_initial),
            ("frame_rate", self.frame_rate),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive(name));
            }
        }

        if self.paddle_height > self.board_height {
            return Err(ConfigError::PaddleTooTall {
                paddle: self.paddle_height,
                board: self.board_height,
            });
        }
        if self.ball_speed_max < self.ball_speed_initial {
            return Err(ConfigError::SpeedCapBelowBase {
                initial: self.ball_speed_initial,
                max: self.ball_speed_max,
            });
        }

        // Per-tick travel at full speed must not skip over a paddle
        let travel = self.ball_speed_max * self.step();
        let depth = self.paddle_width + self.ball_size;
        if travel >= depth {
            return Err(ConfigError::Tunnelling { travel, depth });
        }

        if self.score_limit == 0 {
            return Err(ConfigError::ZeroScoreLimit);
        }
        Ok(())
    }

    /// Fixed time step of one tick, in seconds
    pub fn step(&self) -> f32 {
        1.0 / self.frame_rate
    }

    pub fn board(&self) -> Board {
        Board::new(self.board_width, self.board_height)
    }

    /// Get the X center of the paddle guarding `side`
    pub fn paddle_x(&self, side: Side) -> f32 {
        let offset = self.paddle_inset + self.paddle_width / 2.0;
        match side {
            Side::Left => offset,
            Side::Right => self.board_width - offset,
        }
    }

    /// Clamp paddle center Y so the paddle stays on the board
    pub fn clamp_paddle_y(&self, y: f32) -> f32 {
        let half_height = self.paddle_height / 2.0;
        y.clamp(half_height, self.board_height - half_height)
    }
}

fn positive_env(key: &str) -> Option<f32> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<f32>() {
        Ok(parsed) if parsed > 0.0 => Some(parsed),
        _ => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
