use std::fs;

use crate::integration::common::{
    CERTIFICATE,
    CSR,
    MockAuthority,
    TOKEN,
    Vpki,
};

#[test]
fn sign() {
    let vpki = Vpki::new();
    let authority = MockAuthority::signing();
    fs::write(vpki.file("www.csr"), CSR).unwrap();

    let cmd = vpki.command_args(Some(&authority), &[
        "--csr", "www.csr",
        "--ttl", "1h",
        "www.example.org",
    ]);
    vpki.run(cmd, true);

    assert_eq!(fs::read_to_string(vpki.file("www.example.org.crt")).unwrap(),
               CERTIFICATE);
    assert!(! vpki.file("www.example.org.key").exists());

    let requests = authority.requests();
    assert_eq!(requests.len(), 1);
    let r = &requests[0];
    assert_eq!(r.path, "/v1/pki/sign/pki");
    assert_eq!(r.token.as_deref(), Some(TOKEN));
    assert_eq!(r.body["csr"], CSR);
    assert_eq!(r.body["common_name"], "www.example.org");
    assert_eq!(r.body["ttl"], "3600s");
}

#[test]
fn sign_appends() {
    let vpki = Vpki::new();
    let authority = MockAuthority::signing();
    fs::write(vpki.file("www.csr"), CSR).unwrap();
    fs::write(vpki.file("chain.crt"), "existing chain\n").unwrap();

    let cmd = vpki.command_args(Some(&authority), &[
        "--csr", "www.csr",
        "www.example.org", "chain",
    ]);
    vpki.run(cmd, true);

    assert_eq!(fs::read_to_string(vpki.file("chain.crt")).unwrap(),
               format!("existing chain\n{}", CERTIFICATE));
    assert_eq!(vpki.files(), ["chain.crt", "www.csr"]);
}

#[test]
fn der_signing_request_is_wrapped() {
    let vpki = Vpki::new();
    let authority = MockAuthority::signing();
    fs::write(vpki.file("www.der"), [0x30, 0x82, 0x01, 0x0a, 0xff]).unwrap();

    let cmd = vpki.command_args(Some(&authority), &[
        "--csr", "www.der", "www.example.org",
    ]);
    vpki.run(cmd, true);

    let requests = authority.requests();
    let csr = requests[0].body["csr"].as_str().unwrap();
    assert!(csr.starts_with("-----BEGIN CERTIFICATE REQUEST-----"), "{}", csr);
}

#[test]
fn missing_signing_request() {
    let vpki = Vpki::new();
    let authority = MockAuthority::signing();

    let cmd = vpki.command_args(Some(&authority), &[
        "--csr", "missing.csr", "www.example.org",
    ]);
    let output = vpki.run(cmd, false);
    assert_eq!(output.status.code(), Some(65));
    assert!(authority.requests().is_empty());
    assert!(vpki.files().is_empty());
}

#[test]
fn sign_rejected() {
    let vpki = Vpki::new();
    let authority = MockAuthority::rejecting(400, &["invalid CSR"]);
    fs::write(vpki.file("www.csr"), CSR).unwrap();
    fs::write(vpki.file("www.example.org.crt"), "existing chain\n").unwrap();

    let cmd = vpki.command_args(Some(&authority), &[
        "--csr", "www.csr", "www.example.org",
    ]);
    let output = vpki.run(cmd, false);
    assert_eq!(output.status.code(), Some(69));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CSR"), "{}", stderr);
    assert_eq!(fs::read_to_string(vpki.file("www.example.org.crt")).unwrap(),
               "existing chain\n");
}
