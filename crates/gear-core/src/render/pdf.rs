//! Minimal single-page PDF 1.4 writer (Helvetica text lines, no dependencies).

use chrono::{DateTime, Utc};

const FONT_SIZE: u32 = 18;
const TOP_MARGIN: i32 = 720;
const LINE_HEIGHT: i32 = 24;
const LEFT_MARGIN: i32 = 72;

/// Escape the characters that delimit PDF literal strings.
#[must_use]
pub fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Render text lines top-down on a US Letter page.
#[must_use]
pub fn render_lines(lines: &[String]) -> Vec<u8> {
    let mut ops = Vec::with_capacity(lines.len());
    let mut y = TOP_MARGIN;
    for line in lines {
        ops.push(format!("1 0 0 1 {LEFT_MARGIN} {y} Tm ({}) Tj", escape(line)));
        y -= LINE_HEIGHT;
    }
    let content = format!("BT /F1 {FONT_SIZE} Tf 0 0 0 rg {} ET", ops.join(" "));

    let objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_vec(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// Lines printed on a completion certificate.
#[must_use]
pub fn certificate_lines(
    student_name: &str,
    course_name: &str,
    enrollment_id: &str,
    issued_at: DateTime<Utc>,
) -> Vec<String> {
    vec![
        "Certificate of Completion".to_string(),
        format!("Student: {student_name}"),
        format!("Course: {course_name}"),
        format!("Enrollment ID: {enrollment_id}"),
        format!("Issued: {}", issued_at.format("%Y-%m-%d")),
    ]
}

/// Render a completion certificate.
#[must_use]
pub fn render_certificate(
    student_name: &str,
    course_name: &str,
    enrollment_id: &str,
    issued_at: DateTime<Utc>,
) -> Vec<u8> {
    render_lines(&certificate_lines(
        student_name,
        course_name,
        enrollment_id,
        issued_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape(r"a(b)c\d"), r"a\(b\)c\\d");
    }

    #[test]
    fn certificate_is_well_formed_pdf() {
        let issued = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let pdf = render_certificate("Jo (JJ) Driver", "BDE", "enr-1a2b3c4d", issued);
        let text = String::from_utf8(pdf).unwrap();

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Certificate of Completion) Tj"));
        assert!(text.contains(r"(Student: Jo \(JJ\) Driver) Tj"));
        assert!(text.contains("(Issued: 2026-06-01) Tj"));
        assert!(text.contains("1 0 0 1 72 624 Tm"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_lines(&["hello".to_string()]);
        let text = String::from_utf8(pdf).unwrap();

        let startxref = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap();
        assert!(text[startxref..].starts_with("xref\n0 6\n"));

        let entries: Vec<usize> = text[startxref..]
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().unwrap())
            .collect();
        for (index, offset) in entries.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj\n", index + 1)));
        }
    }
}
