use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_a, is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0, satisfy};
use nom::combinator::{map, map_res, not, opt, recognize, value};
use nom::multi::{many0_count, many1_count};
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, terminated};
use nom::IResult;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Symbolic operator surrounded by optional whitespace.
pub fn op0<'a>(op: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| -> IResult<&'a str, &'a str> {
        let mut parser = delimited(multispace0, tag(op), multispace0);
        parser(input)
    }
}

/// Word operator that may not be directly followed by a name character.
pub fn keyword<'a>(word: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| -> IResult<&'a str, &'a str> {
        let word = terminated(tag(word), not(satisfy(is_name_char)));
        let mut parser = delimited(multispace0, word, multispace0);
        parser(input)
    }
}

pub fn name(input: &str) -> IResult<&str, String> {
    let first = alt((alpha1, tag("_")));
    let others = many0_count(alt((alphanumeric1, tag("_"))));
    let mut parser = map(recognize(pair(first, others)), str::to_string);

    parser(input)
}

pub fn number(input: &str) -> IResult<&str, f64> {
    let mut parser = map_res(recognize_float, str::parse::<f64>);
    parser(input)
}

fn escape(input: &str) -> IResult<&str, &str> {
    let mut parser = alt((
        value("\\", tag("\\")),
        value("\"", tag("\"")),
        value("'", tag("'")),
        value("\n", tag("n")),
        value("\t", tag("t")),
    ));

    parser(input)
}

/// Single or double quoted string with backslash escapes.
pub fn quoted(input: &str) -> IResult<&str, String> {
    let double = delimited(char('"'), opt(escaped_transform(is_not("\\\""), '\\', escape)), char('"'));
    let single = delimited(char('\''), opt(escaped_transform(is_not("\\'"), '\\', escape)), char('\''));
    let mut parser = map(alt((double, single)), Option::unwrap_or_default);

    parser(input)
}

/// Unquoted literal such as `alice`, `3.5` or `white_rabbit`.
pub fn bare(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(many1_count(alt((alphanumeric1, is_a("_-+.")))));
    parser(input)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{bare, keyword, name, number, op0, quoted};

    #[test]
    fn parse_operators() -> Result<(), Box<dyn Error>> {
        let (rest, op) = op0("&&")("  && {q}")?;

        assert_eq!(op, "&&");
        assert_eq!(rest, "{q}");

        let (rest, _) = keyword("S")(" S[0:1] {q}")?;
        assert_eq!(rest, "[0:1] {q}");

        assert!(keyword("once")("onceuponatime").is_err());

        Ok(())
    }

    #[test]
    fn parse_names_and_numbers() -> Result<(), Box<dyn Error>> {
        assert_eq!(name("speed_2 > 3")?, (" > 3", "speed_2".to_string()));
        assert_eq!(number("-24.77]")?, ("]", -24.77));
        assert_eq!(number("1e3")?, ("", 1000.0));
        assert!(number("inf").is_err());

        Ok(())
    }

    #[test]
    fn parse_strings() -> Result<(), Box<dyn Error>> {
        assert_eq!(quoted(r#""say \"hi\"", x"#)?, (", x", "say \"hi\"".to_string()));
        assert_eq!(quoted("'alice'")?, ("", "alice".to_string()));
        assert_eq!(quoted("\"\"")?, ("", String::new()));
        assert_eq!(bare("white_rabbit, *f]")?, (", *f]", "white_rabbit"));

        Ok(())
    }
}
