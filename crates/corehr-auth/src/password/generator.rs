//! Random password generation for administrative resets.

use rand::Rng;
use rand::seq::SliceRandom;

use corehr_core::config::auth::AuthConfig;
use corehr_core::error::AppError;

use super::validator::PasswordValidator;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+";
const GENERATED_LENGTH: usize = 12;
const MAX_ATTEMPTS: usize = 64;

/// Produces random passwords that satisfy the strength policy.
#[derive(Debug, Clone)]
pub struct PasswordGenerator {
    validator: PasswordValidator,
}

impl PasswordGenerator {
    /// Creates a generator bound to the configured policy.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            validator: PasswordValidator::new(config),
        }
    }

    /// Generates a random password that passes the strength validator.
    ///
    /// Sampling is retried a bounded number of times; if no sample passes
    /// (practically unreachable), a compliant password is constructed by
    /// drawing one character from each required class.
    pub fn generate(&self) -> Result<String, AppError> {
        let mut rng = rand::thread_rng();

        for _ in 0..MAX_ATTEMPTS {
            let candidate: String = (0..GENERATED_LENGTH)
                .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
                .collect();

            if self.validator.is_strong(&candidate) {
                return Ok(candidate);
            }
        }

        self.construct_compliant(&mut rng)
    }

    /// Builds a password with one guaranteed character per required class,
    /// shuffled so class positions are not predictable.
    fn construct_compliant(&self, rng: &mut impl Rng) -> Result<String, AppError> {
        let classes: [&[u8]; 4] = [
            b"abcdefghijklmnopqrstuvwxyz",
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            b"0123456789",
            b"!@#$%^&*()_+",
        ];

        let mut chars: Vec<char> = classes
            .iter()
            .map(|class| class[rng.gen_range(0..class.len())] as char)
            .collect();

        while chars.len() < GENERATED_LENGTH {
            chars.push(CHARSET[rng.gen_range(0..CHARSET.len())] as char);
        }
        chars.shuffle(rng);

        let password: String = chars.into_iter().collect();
        if !self.validator.is_strong(&password) {
            return Err(AppError::internal(
                "Generated password failed the strength policy",
            ));
        }
        Ok(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corehr_core::config::auth::AuthConfig;

    #[test]
    fn test_generated_password_is_strong() {
        let config = AuthConfig::default();
        let generator = PasswordGenerator::new(&config);
        let validator = PasswordValidator::new(&config);

        for _ in 0..20 {
            let password = generator.generate().unwrap();
            assert_eq!(password.len(), GENERATED_LENGTH);
            assert!(validator.is_strong(&password), "weak: {password}");
        }
    }

    #[test]
    fn test_constructed_fallback_is_strong() {
        let config = AuthConfig::default();
        let generator = PasswordGenerator::new(&config);
        let password = generator
            .construct_compliant(&mut rand::thread_rng())
            .unwrap();
        assert!(PasswordValidator::new(&config).is_strong(&password));
    }
}
