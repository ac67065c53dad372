use std::fs;

use crate::integration::common::{
    CERTIFICATE,
    MockAuthority,
    PRIVATE_KEY,
    TOKEN,
    Vpki,
};

#[test]
fn generate() {
    let vpki = Vpki::new();
    let authority = MockAuthority::generating();

    let cmd = vpki.command_args(Some(&authority), &[
        "--alt", "example.org,www2.example.org",
        "--ips", "10.0.0.1",
        "--org", "Acme",
        "--ttl", "24h",
        "www.example.org",
    ]);
    vpki.run(cmd, true);

    assert_eq!(fs::read_to_string(vpki.file("www.example.org.crt")).unwrap(),
               CERTIFICATE);
    assert_eq!(fs::read_to_string(vpki.file("www.example.org.key")).unwrap(),
               PRIVATE_KEY);
    assert_eq!(vpki.files(), ["www.example.org.crt", "www.example.org.key"]);

    let requests = authority.requests();
    assert_eq!(requests.len(), 1);
    let r = &requests[0];
    assert_eq!(r.method, "POST");
    assert_eq!(r.path, "/v1/pki/issue/pki");
    assert_eq!(r.token.as_deref(), Some(TOKEN));
    assert_eq!(r.body["common_name"], "www.example.org");
    assert_eq!(r.body["alt_names"],
               "example.org,www2.example.org,www.example.org");
    assert_eq!(r.body["ip_sans"], "10.0.0.1");
    assert_eq!(r.body["organization"], "Acme");
    assert_eq!(r.body["ou"], "Acme");
    assert_eq!(r.body["ttl"], "86400s");
}

#[test]
fn generate_with_prefix_replaces() {
    let vpki = Vpki::new();
    let authority = MockAuthority::generating();

    fs::create_dir(vpki.file("out")).unwrap();
    fs::write(vpki.file("out/server.crt"),
              format!("{}\n{}\n", CERTIFICATE, CERTIFICATE)).unwrap();
    fs::write(vpki.file("out/server.key"), "an old key").unwrap();

    let cmd = vpki.command_args(Some(&authority),
                                &["www.example.org", "out/server"]);
    vpki.run(cmd, true);

    assert_eq!(fs::read_to_string(vpki.file("out/server.crt")).unwrap(),
               CERTIFICATE);
    assert_eq!(fs::read_to_string(vpki.file("out/server.key")).unwrap(),
               PRIVATE_KEY);
    assert_eq!(fs::read_dir(vpki.file("out")).unwrap().count(), 2);

    // Without --ttl, a year is requested.
    let requests = authority.requests();
    assert_eq!(requests[0].body["ttl"], "31536000s");
    assert_eq!(requests[0].body["alt_names"], "www.example.org");
    assert!(requests[0].body.get("ip_sans").is_none());
}

#[test]
fn unwritable_key_keeps_certificate() {
    let vpki = Vpki::new();
    let authority = MockAuthority::generating();

    fs::write(vpki.file("www.example.org.crt"), "OLD CERT").unwrap();
    fs::create_dir(vpki.file("www.example.org.key")).unwrap();

    let cmd = vpki.command_args(Some(&authority), &["www.example.org"]);
    let output = vpki.run(cmd, false);
    assert_eq!(output.status.code(), Some(73));

    assert_eq!(fs::read_to_string(vpki.file("www.example.org.crt")).unwrap(),
               "OLD CERT");
    assert_eq!(vpki.files(), ["www.example.org.crt", "www.example.org.key"]);
}

#[cfg(unix)]
#[test]
fn private_key_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let vpki = Vpki::new();
    let authority = MockAuthority::generating();

    let cmd = vpki.command_args(Some(&authority), &["www.example.org"]);
    vpki.run(cmd, true);

    let mode = fs::metadata(vpki.file("www.example.org.key")).unwrap()
        .permissions().mode();
    assert_eq!(mode & 0o077, 0, "mode is {:o}", mode);
}

#[test]
fn unparsable_ip_address_is_replaced() {
    let vpki = Vpki::new();
    let authority = MockAuthority::generating();

    let cmd = vpki.command_args(Some(&authority), &[
        "--ips", "10.0.0.1,not-an-address",
        "www.example.org",
    ]);
    let output = vpki.run(cmd, true);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not-an-address"), "{}", stderr);

    let requests = authority.requests();
    assert_eq!(requests[0].body["ip_sans"], "10.0.0.1,0.0.0.0");
}

#[test]
fn missing_private_key() {
    let vpki = Vpki::new();
    // The signing response carries no private key.
    let authority = MockAuthority::signing();

    let cmd = vpki.command_args(Some(&authority), &["www.example.org"]);
    let output = vpki.run(cmd, false);
    assert_eq!(output.status.code(), Some(69));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("private"), "{}", stderr);
    assert!(vpki.files().is_empty());
}

#[test]
fn rejected() {
    let vpki = Vpki::new();
    let authority = MockAuthority::rejecting(403, &["permission denied"]);

    let cmd = vpki.command_args(Some(&authority), &["www.example.org"]);
    let output = vpki.run(cmd, false);
    assert_eq!(output.status.code(), Some(69));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("denied"), "{}", stderr);
    assert!(vpki.files().is_empty());
    assert_eq!(authority.requests().len(), 1);
}

#[test]
fn verbose_relays_warnings() {
    let vpki = Vpki::new();
    let authority = MockAuthority::start(200, &serde_json::json!({
        "data": {
            "certificate": CERTIFICATE,
            "private_key": PRIVATE_KEY,
        },
        "warnings": ["TTL exceeds the role's maximum"],
    }).to_string());

    let cmd = vpki.command_args(Some(&authority),
                                &["-v", "www.example.org"]);
    let output = vpki.run(cmd, true);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TTL exceeds the role's maximum"), "{}", stderr);
    assert!(! stderr.contains(TOKEN));

    let cmd = vpki.command_args(Some(&authority), &["www.example.org"]);
    let output = vpki.run(cmd, true);
    assert!(output.stderr.is_empty());
}
