use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn xmljson() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("xmljson")?;
    cmd.env_remove("XMLJSON_ATTRIBUTE_PREFIX").env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_convert_stdin_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .arg("convert")
        .write_stdin("<r><x>1</x><x>2</x></r>")
        .assert()
        .success()
        .stdout("{\"r\":{\"x\":[\"1\",\"2\"]}}\n");
    Ok(())
}

#[test]
fn test_convert_file_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.json");
    fs::write(&input, "<a id=\"1\"><b/></a>")?;

    xmljson()?
        .args(["convert", "--pretty", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout("");

    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        "{\n  \"a\": {\n    \"@id\": \"1\",\n    \"b\": null\n  }\n}\n"
    );
    Ok(())
}

#[test]
fn test_convert_options() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["convert", "--attribute-prefix", "_", "--no-namespaces"])
        .write_stdin(r#"<p:a xmlns:p="urn:p" p:id="7"/>"#)
        .assert()
        .success()
        .stdout("{\"a\":{\"_id\":\"7\"}}\n");
    Ok(())
}

#[test]
fn test_attribute_prefix_from_env() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .env("XMLJSON_ATTRIBUTE_PREFIX", "$")
        .arg("convert")
        .write_stdin(r#"<a id="1"/>"#)
        .assert()
        .success()
        .stdout("{\"a\":{\"$id\":\"1\"}}\n");
    Ok(())
}

#[test]
fn test_empty_prefix_is_a_configuration_error() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["convert", "--attribute-prefix", ""])
        .write_stdin("<a/>")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("configuration error"));
    Ok(())
}

#[test]
fn test_malformed_xml_fails() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .arg("convert")
        .write_stdin("<a><b></a>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to convert stdin"));
    Ok(())
}

#[test]
fn test_max_depth_flag() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["convert", "--max-depth", "1"])
        .write_stdin("<a><b/></a>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max depth exceeded"));
    Ok(())
}

#[test]
fn test_unlimited_depth_flag_converts_deep_input() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 50_000;
    let xml = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
    xmljson()?
        .args(["convert", "--max-depth", "0"])
        .write_stdin(xml)
        .assert()
        .success()
        .stdout(predicate::str::ends_with("{\"n\":null}}}\n"));
    Ok(())
}

#[test]
fn test_decode_uri_latin1() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["decode", "uri", "%80", "--charset", "ISO-8859-1"])
        .assert()
        .success()
        .stdout("\u{80}\n");
    Ok(())
}

#[test]
fn test_decode_base64url() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["decode", "base64url", "aGVsbG8"])
        .assert()
        .success()
        .stdout("hello");

    xmljson()?
        .args(["decode", "base64url", "aGVs+G8="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("decode error"));
    Ok(())
}

#[test]
fn test_decode_uri() -> Result<(), Box<dyn std::error::Error>> {
    xmljson()?
        .args(["decode", "uri", "a%20b+c"])
        .assert()
        .success()
        .stdout("a b c\n");

    xmljson()?
        .args(["decode", "uri", "%20", "--charset", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported charset"));
    Ok(())
}
