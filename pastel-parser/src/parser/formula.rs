use nom::branch::alt;
use nom::character::complete::multispace0;
use nom::sequence::{delimited, terminated};
use nom::IResult;
use pastel_core::formula::Formula;

use super::atoms::{listing, record};
use super::common::op0;
use super::errors::ParseError;
use super::operators;

fn subformula(input: &str) -> IResult<&str, Formula> {
    let mut parser = delimited(op0("("), formula, op0(")"));
    parser(input)
}

fn primary(input: &str) -> IResult<&str, Formula> {
    let mut parser = alt((subformula, record, listing));
    parser(input)
}

// Quantifier bodies extend as far to the right as possible.
fn unary(input: &str) -> IResult<&str, Formula> {
    let mut parser = alt((
        operators::not(unary),
        operators::previous(unary),
        operators::once(unary),
        operators::historically(unary),
        operators::exists(formula),
        operators::forall(formula),
        primary,
    ));

    parser(input)
}

fn since(input: &str) -> IResult<&str, Formula> {
    let mut parser = operators::since(unary);
    parser(input)
}

fn conjunction(input: &str) -> IResult<&str, Formula> {
    let mut parser = operators::and(since);
    parser(input)
}

fn disjunction(input: &str) -> IResult<&str, Formula> {
    let mut parser = operators::or(conjunction);
    parser(input)
}

fn implication(input: &str) -> IResult<&str, Formula> {
    let mut parser = operators::implies(disjunction, implication);
    parser(input)
}

fn formula(input: &str) -> IResult<&str, Formula> {
    implication(input)
}

/// Parse a complete formula. Input left over after the formula is an error.
pub fn parse_formula(input: &str) -> Result<Formula, ParseError> {
    let mut parser = terminated(formula, multispace0);
    let (rest, parsed) = parser(input)?;

    if !rest.is_empty() {
        Err(ParseError::incomplete(rest))
    } else {
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use pastel_core::formula::{Comparison, FieldTest, Formula, TimeBound};

    use super::parse_formula;

    #[test]
    fn parse_precedence() -> Result<(), Box<dyn Error>> {
        let parsed = parse_formula("!{a} && {b} S {c} || {d} -> {e}")?;
        let expected = Formula::prop("a")
            .not()
            .and(Formula::prop("b").since(Formula::prop("c")))
            .or(Formula::prop("d"))
            .implies(Formula::prop("e"));

        assert_eq!(parsed, expected);

        Ok(())
    }

    #[test]
    fn parse_temporal_operators() -> Result<(), Box<dyn Error>> {
        let parsed = parse_formula("historically[0:5] (once {p} -> Y {q})")?;
        let body = Formula::prop("p").once().implies(Formula::prop("q").previous());

        assert_eq!(parsed, body.historically_within(TimeBound::new(0.0, 5.0)));

        let parsed = parse_formula("{p} since[2:] H[1:3] {q}")?;
        let right = Formula::prop("q").historically_within(TimeBound::new(1.0, 3.0));

        assert_eq!(parsed, Formula::prop("p").since_within(TimeBound::at_least(2.0), right));

        Ok(())
    }

    #[test]
    fn parse_quantifiers() -> Result<(), Box<dyn Error>> {
        let parsed = parse_formula("exists[file]. once [access, *user, *file] && {ok}")?;
        let body = Formula::listing([
            FieldTest::String("access".into()),
            FieldTest::Bind("user".into()),
            FieldTest::Bind("file".into()),
        ]);

        assert_eq!(parsed, Formula::exists(["file"], body.once().and(Formula::prop("ok"))));

        let parsed = parse_formula("{a} -> A[u, v]. [*u, *v]")?;
        let body = Formula::listing([FieldTest::Bind("u".into()), FieldTest::Bind("v".into())]);

        assert_eq!(parsed, Formula::prop("a").implies(Formula::forall(["u", "v"], body)));

        Ok(())
    }

    #[test]
    fn display_round_trip() -> Result<(), Box<dyn Error>> {
        let formulas = [
            Formula::compare("x", Comparison::Le, -2.5).since_within(TimeBound::new(1.0, 3.0), Formula::prop("q")),
            Formula::prop("p").not().or(Formula::field("user", FieldTest::String("bob".into()))),
            Formula::field("mode", FieldTest::Bool(false)).previous().historically(),
            Formula::exists(["f"], Formula::listing([FieldTest::Any, FieldTest::Bind("f".into())]).once()),
        ];

        for formula in formulas {
            assert_eq!(parse_formula(&formula.to_string())?, formula);
        }

        Ok(())
    }

    #[test]
    fn reject_malformed_input() {
        let err = parse_formula("{p} && {q} )").unwrap_err();

        assert!(err.is_incomplete());
        assert_eq!(err.remaining(), ")");

        let err = parse_formula("once[1:2]").unwrap_err();
        assert!(!err.is_incomplete());

        assert!(parse_formula("{p} &&").is_err());
        assert!(parse_formula("").is_err());
    }
}
