use rand::Rng;

/// NanoID alphabet (38 characters, lowercase alphanumeric + _-)
const NANOID_ALPHABET: &[u8] = b"_-0123456789abcdefghijklmnopqrstuvwxyz";

const DEFAULT_ID_LENGTH: usize = 8;

/// Generate an 8 character NanoID, used for connection ids.
pub fn generate_id() -> String {
    generate_nanoid(DEFAULT_ID_LENGTH)
}

pub fn generate_nanoid(length: usize) -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(length);
    let len = NANOID_ALPHABET.len();

    for _ in 0..length {
        let idx = rng.random_range(0..len);
        id.push(NANOID_ALPHABET[idx] as char);
    }
    id
}
