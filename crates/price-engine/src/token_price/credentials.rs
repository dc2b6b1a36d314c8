use std::fmt::Debug;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the API key attached to each outbound price request.
pub trait CredentialPool: Debug + Send + Sync {
    fn next_credential(&self) -> String;
}

/// Spreads requests uniformly over a set of interchangeable keys.
#[derive(Debug)]
pub struct RandomCredentialPool {
    keys: Vec<String>,
    rng: Mutex<StdRng>,
}

impl RandomCredentialPool {
    /// Returns `None` when no usable key remains after deduplication.
    pub fn new(keys: Vec<String>, rng: StdRng) -> Option<Self> {
        let mut unique: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            if !key.is_empty() && !unique.contains(&key) {
                unique.push(key);
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(RandomCredentialPool { keys: unique, rng: Mutex::new(rng) })
    }

    pub fn from_entropy(keys: Vec<String>) -> Option<Self> {
        Self::new(keys, StdRng::from_entropy())
    }

    pub fn seeded(keys: Vec<String>, seed: u64) -> Option<Self> {
        Self::new(keys, StdRng::seed_from_u64(seed))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

impl CredentialPool for RandomCredentialPool {
    fn next_credential(&self) -> String {
        let index = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..self.keys.len()),
            Err(poisoned) => poisoned.into_inner().gen_range(0..self.keys.len()),
        };
        self.keys[index].clone()
    }
}

/// Always hands out the same key.
#[derive(Debug, Clone)]
pub struct FixedCredential(pub String);

impl CredentialPool for FixedCredential {
    fn next_credential(&self) -> String {
        self.0.clone()
    }
}
