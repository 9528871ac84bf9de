use embedded_hal::delay::DelayNs;

use crate::clock::{Clock, elapsed_ms};
use crate::config::Config;
use crate::decoder;
use crate::error::DhtError;
use crate::line::{DataLine, LineMode};
use crate::reading::{Reading, convert};

/// Driver for the DHT22 temperature and humidity sensor.
///
/// Owns the data line for its whole lifetime. Reads are spaced at least
/// [`Config::min_interval_ms`] apart; calling sooner returns the previous
/// result without touching the line.
///
/// Not reentrant: a driver shared between threads or interrupt handlers must be
/// wrapped in a mutex by the caller.
pub struct Dht22<L, D, C> {
    line: L,
    delay: D,
    clock: C,
    config: Config,
    /// `None` until the first attempt, so the first read always goes to the sensor.
    last_attempt_ms: Option<u32>,
    last_reading: Option<Reading>,
}

impl<L, D, C> Dht22<L, D, C>
where
    L: DataLine,
    D: DelayNs,
    C: Clock,
{
    /// Creates a new instance of the DHT22 driver with the default [`Config`].
    ///
    /// The line is not touched here; call [`init`](Self::init) to release it
    /// before the first read.
    ///
    /// # Arguments
    ///
    /// * `line` - The sensor's data line, e.g. an [`OpenDrain`](crate::line::OpenDrain) pin.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Millisecond time source used for rate limiting.
    pub fn new(line: L, delay: D, clock: C) -> Self {
        Self::with_config(line, delay, clock, Config::default())
    }

    /// Creates a driver with explicit settings.
    pub fn with_config(line: L, delay: D, clock: C, config: Config) -> Self {
        debug!("max pulse cycles: {}", config.cycle_budget.get());
        Dht22 {
            line,
            delay,
            clock,
            config,
            last_attempt_ms: None,
            last_reading: None,
        }
    }

    /// Releases the data line to the pull-up so the bus idles high.
    ///
    /// Every read releases the line again before its start request, so this
    /// only matters between construction and the first read.
    pub fn init(&mut self) -> Result<(), DhtError<L::Error>> {
        self.line.set_mode(LineMode::InputPullUp)?;
        Ok(())
    }

    /// Reads a temperature and humidity measurement from the DHT22 sensor.
    ///
    /// If the previous attempt was less than [`Config::min_interval_ms`] ago the
    /// sensor is not contacted: the previous reading is returned again, or
    /// [`DhtError::NotReady`] if the previous attempt failed.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the read is successful, the checksum is valid and both
    ///   values are within the sensor's range.
    /// * `Err(DhtError)` if a communication, checksum or range error occurs.
    pub fn read(&mut self) -> Result<Reading, DhtError<L::Error>> {
        self.read_inner(false)
    }

    /// Reads from the sensor regardless of when it was last read.
    pub fn read_forced(&mut self) -> Result<Reading, DhtError<L::Error>> {
        self.read_inner(true)
    }

    /// Result of the last successful read, if the last attempt succeeded.
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// The settings this driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the line, delay and clock.
    pub fn release(self) -> (L, D, C) {
        (self.line, self.delay, self.clock)
    }

    fn read_inner(&mut self, force: bool) -> Result<Reading, DhtError<L::Error>> {
        let now = self.clock.now_ms();

        if !force {
            if let Some(last) = self.last_attempt_ms {
                let elapsed = elapsed_ms(now, last);
                if elapsed < self.config.min_interval_ms {
                    debug!("skipping read, last attempt {} ms ago", elapsed);
                    return self.last_reading.ok_or(DhtError::NotReady);
                }
            }
        }

        self.last_attempt_ms = Some(now);
        self.last_reading = None;

        let reading = self.fetch()?;
        self.last_reading = Some(reading);
        Ok(reading)
    }

    /// Decodes one frame from the sensor, validates and converts it.
    fn fetch(&mut self) -> Result<Reading, DhtError<L::Error>> {
        let frame = decoder::decode(&mut self.line, &mut self.delay, self.config.cycle_budget)?;
        debug!(
            "received {:?} =? {}",
            frame.bytes(),
            frame.computed_checksum()
        );

        frame.validate().map_err(|err| {
            warn!("checksum failure");
            DhtError::from_frame(err)
        })?;

        convert(&frame).map_err(|err| {
            warn!("reading out of range");
            DhtError::from_frame(err)
        })
    }
}
