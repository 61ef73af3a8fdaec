//! COPY command construction.

/// Builder for the Redshift COPY command that loads one uploaded spool
/// file into its target table.
///
/// The rendered command is:
///
/// ```text
/// COPY <table>(<f1>, <f2>, ...) FROM 's3://<bucket>/<key>'
///     CREDENTIALS 'aws_access_key_id=<id>;aws_secret_access_key=<secret>' ESCAPE
/// ```
///
/// (rendered on a single line). The trailing `ESCAPE` pairs with the
/// backslash escaping used in spool lines, so `\|` and `\\` decode back
/// to literal characters and `\N` stays the null marker.
#[derive(Debug, Clone)]
pub struct CopyCommand<'a> {
    pub table: &'a str,
    pub fields: &'a [String],
    pub bucket: &'a str,
    pub key: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
}

impl CopyCommand<'_> {
    pub fn render(&self) -> String {
        format!(
            "COPY {}({}) FROM 's3://{}/{}' CREDENTIALS 'aws_access_key_id={};aws_secret_access_key={}' ESCAPE",
            self.table,
            self.fields.join(", "),
            self.bucket,
            self.key,
            self.access_key_id,
            self.secret_access_key,
        )
    }
}

#[cfg(test)]
#[path = "copy_test.rs"]
mod copy_test;
