use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, opt, value};
use nom::multi::{separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;
use pastel_core::formula::{Comparison, FieldPath, FieldTest, Formula};

use super::common::{bare, name, number, op0, quoted};

fn comparison(input: &str) -> IResult<&str, Comparison> {
    let mut parser = alt((
        value(Comparison::Le, tag("<=")),
        value(Comparison::Ge, tag(">=")),
        value(Comparison::Eq, tag("==")),
        value(Comparison::Ne, tag("!=")),
        value(Comparison::Lt, tag("<")),
        value(Comparison::Gt, tag(">")),
    ));

    parser(input)
}

fn threshold(input: &str) -> IResult<&str, FieldTest> {
    let mut parser = pair(preceded(multispace0, comparison), preceded(multispace0, number));
    let (rest, (comparison, constant)) = parser(input)?;

    Ok((rest, FieldTest::Compare(comparison, constant)))
}

fn classify(token: &str) -> FieldTest {
    let numeric = token.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));

    match token {
        "true" => FieldTest::Bool(true),
        "false" => FieldTest::Bool(false),
        _ if numeric => match token.parse::<f64>() {
            Ok(constant) => FieldTest::Compare(Comparison::Eq, constant),
            Err(_) => FieldTest::String(token.to_string()),
        },
        _ => FieldTest::String(token.to_string()),
    }
}

/// Test written after a colon in a record or as a listing item.
fn literal(input: &str) -> IResult<&str, FieldTest> {
    let variable = map(preceded(char('*'), opt(name)), |name| match name {
        Some(name) => FieldTest::Bind(name),
        None => FieldTest::Any,
    });

    let mut parser = alt((variable, map(quoted, FieldTest::String), threshold, map(bare, classify)));
    parser(input)
}

fn path(input: &str) -> IResult<&str, FieldPath> {
    let mut parser = map(separated_list1(char('.'), name), FieldPath::new);
    parser(input)
}

fn field(input: &str) -> IResult<&str, (FieldPath, FieldTest)> {
    let test = alt((preceded(op0(":"), literal), threshold));
    let mut parser = pair(path, opt(test));
    let (rest, (path, test)) = parser(input)?;

    Ok((rest, (path, test.unwrap_or(FieldTest::Truthy))))
}

/// Record atom, `{door, speed > 3, user: alice}`.
pub fn record(input: &str) -> IResult<&str, Formula> {
    let fields = separated_list1(op0(","), field);
    let mut parser = map(delimited(op0("{"), fields, op0("}")), Formula::record);

    parser(input)
}

/// Listing atom, `[access, alice, *file]`.
pub fn listing(input: &str) -> IResult<&str, Formula> {
    let items = separated_list0(op0(","), literal);
    let mut parser = map(delimited(op0("["), items, op0("]")), Formula::listing);

    parser(input)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use pastel_core::formula::{Comparison, FieldTest, Formula};

    use super::{field, listing, literal, record};

    #[test]
    fn parse_literals() -> Result<(), Box<dyn Error>> {
        assert_eq!(literal("*")?, ("", FieldTest::Any));
        assert_eq!(literal("*file")?, ("", FieldTest::Bind("file".into())));
        assert_eq!(literal("true")?, ("", FieldTest::Bool(true)));
        assert_eq!(literal("-3.5")?, ("", FieldTest::Compare(Comparison::Eq, -3.5)));
        assert_eq!(literal(">= 2")?, ("", FieldTest::Compare(Comparison::Ge, 2.0)));
        assert_eq!(literal("'on'")?, ("", FieldTest::String("on".into())));
        assert_eq!(literal("infinity")?, ("", FieldTest::String("infinity".into())));
        assert_eq!(literal("v1.2-rc")?, ("", FieldTest::String("v1.2-rc".into())));

        Ok(())
    }

    #[test]
    fn parse_fields() -> Result<(), Box<dyn Error>> {
        let (_, (path, test)) = field("car.speed > 3")?;

        assert_eq!(path.to_string(), "car.speed");
        assert_eq!(test, FieldTest::Compare(Comparison::Gt, 3.0));

        let (_, (path, test)) = field("door")?;

        assert_eq!(path.to_string(), "door");
        assert_eq!(test, FieldTest::Truthy);

        Ok(())
    }

    #[test]
    fn parse_record() -> Result<(), Box<dyn Error>> {
        let (rest, atom) = record("{ door, user: alice , file: *f, x <= -1 } && {p}")?;
        let expected = Formula::record([
            ("door", FieldTest::Truthy),
            ("user", FieldTest::String("alice".into())),
            ("file", FieldTest::Bind("f".into())),
            ("x", FieldTest::Compare(Comparison::Le, -1.0)),
        ]);

        assert_eq!(rest, "&& {p}");
        assert_eq!(atom, expected);
        assert!(record("{}").is_err());

        Ok(())
    }

    #[test]
    fn parse_listing() -> Result<(), Box<dyn Error>> {
        let (rest, atom) = listing("[access, \"alice\", *file]")?;
        let expected = Formula::listing([
            FieldTest::String("access".into()),
            FieldTest::String("alice".into()),
            FieldTest::Bind("file".into()),
        ]);

        assert_eq!(rest, "");
        assert_eq!(atom, expected);
        assert_eq!(listing("[]")?, ("", Formula::listing([])));

        Ok(())
    }
}
