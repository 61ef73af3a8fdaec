use super::CopyCommand;

#[test]
fn render_matches_redshift_syntax_exactly() {
    let fields = vec!["id".to_string(), "name".to_string(), "ts".to_string()];
    let command = CopyCommand {
        table: "events",
        fields: &fields,
        bucket: "load-bucket",
        key: "events_1714988388000_4242.log",
        access_key_id: "AKIAEXAMPLE",
        secret_access_key: "wJalrXUtnFEMI",
    };

    assert_eq!(
        command.render(),
        "COPY events(id, name, ts) FROM 's3://load-bucket/events_1714988388000_4242.log' \
         CREDENTIALS 'aws_access_key_id=AKIAEXAMPLE;aws_secret_access_key=wJalrXUtnFEMI' ESCAPE"
    );
}

#[test]
fn render_single_field_has_no_separator() {
    let fields = vec!["payload".to_string()];
    let command = CopyCommand {
        table: "raw",
        fields: &fields,
        bucket: "b",
        key: "raw_1_2.log",
        access_key_id: "id",
        secret_access_key: "secret",
    };

    assert_eq!(
        command.render(),
        "COPY raw(payload) FROM 's3://b/raw_1_2.log' \
         CREDENTIALS 'aws_access_key_id=id;aws_secret_access_key=secret' ESCAPE"
    );
}
