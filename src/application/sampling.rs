use std::time::Instant;

/// Decide qué frames se envían a la API de visión: uno de cada `every`.
#[derive(Debug, Clone)]
pub struct Sampler {
    every: u32,
    counter: u64,
}

impl Sampler {
    pub fn new(every: u32) -> Self {
        Self { every: every.max(1), counter: 0 }
    }

    pub fn due(&self) -> bool {
        self.counter % self.every as u64 == 0
    }

    pub fn advance(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    pub fn frames(&self) -> u64 {
        self.counter
    }
}

/// Estimación de FPS: media exponencial del instantáneo y media acumulada.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    last: Instant,
    ema: f32,
    total_secs: f64,
    frames: u64,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    pub fn new() -> Self {
        Self { last: Instant::now(), ema: 0.0, total_secs: 0.0, frames: 0 }
    }

    /// Registra un frame terminado y devuelve `(instantáneo, suavizado)`.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.record(dt)
    }

    fn record(&mut self, dt: f32) -> (f32, f32) {
        let dt = dt.max(0.001);
        self.total_secs += dt as f64;
        self.frames += 1;
        let instant = 1.0 / dt;
        self.ema = 0.9 * self.ema + 0.1 * instant;
        (instant, self.ema)
    }

    pub fn estimate(&self) -> f32 {
        self.ema
    }

    pub fn average(&self) -> f32 {
        if self.total_secs <= 0.0 {
            0.0
        } else {
            (self.frames as f64 / self.total_secs) as f32
        }
    }
}
