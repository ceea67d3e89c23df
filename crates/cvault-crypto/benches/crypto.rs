use cvault_crypto::{decrypt, derive_key, encrypt};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench]
fn bench_derive_key(bencher: divan::Bencher) {
    let passphrase = SecretString::from("bench-passphrase");
    let salt = [0xABu8; 16];
    bencher.bench(|| derive_key(divan::black_box(&passphrase), divan::black_box(&salt)));
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let passphrase = SecretString::from("bench-passphrase");
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&data), divan::black_box(&passphrase)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let passphrase = SecretString::from("bench-passphrase");
    let data = make_data(size);
    let container = encrypt(&data, &passphrase).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&container), divan::black_box(&passphrase)).unwrap());
}

fn main() {
    divan::main();
}
