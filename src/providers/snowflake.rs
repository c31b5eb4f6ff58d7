use std::sync::{Arc, Mutex};

use crate::error::{RedChatError, Result};
use crate::interfaces::clock::{Clock, SystemClock};
use crate::interfaces::ids::IdGenerator;

/// 2010-11-04T01:42:54.657Z, the customary snowflake epoch.
pub const EPOCH_MILLIS: i64 = 1_288_834_974_657;
pub const MAX_NODE_ID: i64 = (1 << NODE_BITS) - 1;

const NODE_BITS: u32 = 10;
const STEP_BITS: u32 = 12;
const STEP_MASK: i64 = (1 << STEP_BITS) - 1;

struct State {
    last_millis: i64,
    step: i64,
}

/// Snowflake ids: 41 bits of milliseconds, 10 bits of node, 12 bits of sequence,
/// rendered as 19-digit zero-padded decimals so string order is generation order.
pub struct SnowflakeIdGenerator {
    node_id: i64,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl SnowflakeIdGenerator {
    pub fn new(node_id: i64) -> Result<Self> {
        Self::with_clock(node_id, Arc::new(SystemClock))
    }

    pub fn with_clock(node_id: i64, clock: Arc<dyn Clock>) -> Result<Self> {
        if !(0..=MAX_NODE_ID).contains(&node_id) {
            return Err(RedChatError::Config(format!(
                "snowflake node id {node_id} outside 0..={MAX_NODE_ID}"
            )));
        }
        Ok(Self {
            node_id,
            clock,
            state: Mutex::new(State {
                last_millis: 0,
                step: 0,
            }),
        })
    }

    pub fn next_raw(&self) -> i64 {
        let now = self.clock.now_millis() - EPOCH_MILLIS;
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // A clock that stalls or steps back keeps counting on the last
        // millisecond; an exhausted sequence borrows the next one.
        if now > state.last_millis {
            state.last_millis = now;
            state.step = 0;
        } else {
            state.step = (state.step + 1) & STEP_MASK;
            if state.step == 0 {
                state.last_millis += 1;
            }
        }

        (state.last_millis << (NODE_BITS + STEP_BITS))
            | (self.node_id << STEP_BITS)
            | state.step
    }
}

impl IdGenerator for SnowflakeIdGenerator {
    fn next_id(&self) -> String {
        format!("{:019}", self.next_raw())
    }
}
