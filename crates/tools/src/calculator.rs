//! Calculator tool — evaluates mathematical expressions.
//!
//! Supports arithmetic (`+`, `-`, `*`, `/`, parentheses, unary negation),
//! the functions sqrt, sin, cos, tan, log, abs, round, min, max, and the
//! constants pi and e. Uses a recursive-descent parser for correctness.
//! No dependencies beyond std.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolParams, ToolResult};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports +, -, *, /, parentheses, \
decimal numbers, the functions sqrt, sin, cos, tan, log, abs, round, min, max, \
and the constants pi and e.\n\n\
Parameters:\n\
- expression (str): the expression to evaluate\n\n\
Example: expression=sqrt(16) + 2"
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
        let expr = params
            .get("expression")
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'expression' parameter".into()))?;

        match evaluate(expr) {
            Ok(value) => {
                let mut metadata = serde_json::Map::new();
                metadata.insert("result".into(), serde_json::json!(value));
                Ok(ToolResult::ok_with_metadata(
                    format!("Calculation: {} = {}", expr.trim(), format_value(value)),
                    metadata,
                ))
            }
            Err(e) => Ok(ToolResult::failed(format!("Calculation error: {e}"))),
        }
    }
}

/// Render a value the way the synthesis prompt expects: whole numbers keep
/// one decimal place ("6.0"), everything else prints naturally.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            ',' => { tokens.push(Token::Comma); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {num_str}"))?;
                tokens.push(Token::Number(num));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            c => return Err(format!("Unexpected character: '{c}'")),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("Division by zero".into());
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = '-' unary | primary
    fn parse_unary(&mut self) -> Result<f64, String> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let val = self.parse_unary()?;
            return Ok(-val);
        }
        self.parse_primary()
    }

    // primary = NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.consume().cloned() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_args()?;
                    apply_function(&name, &args)
                } else {
                    match name.as_str() {
                        "pi" => Ok(std::f64::consts::PI),
                        "e" => Ok(std::f64::consts::E),
                        _ => Err(format!("Unknown constant: {name}")),
                    }
                }
            }
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("Unexpected token: {tok:?}")),
            None => Err("Unexpected end of expression".into()),
        }
    }

    // args = expr (',' expr)*
    fn parse_args(&mut self) -> Result<Vec<f64>, String> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err("Expected ',' or ')' in function call".into()),
            }
        }
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, String> {
    let unary = |args: &[f64]| -> Result<f64, String> {
        match args {
            [x] => Ok(*x),
            _ => Err(format!("{name} expects exactly one argument")),
        }
    };

    match name {
        "sqrt" => {
            let x = unary(args)?;
            if x < 0.0 {
                return Err("sqrt of a negative number".into());
            }
            Ok(x.sqrt())
        }
        "sin" => Ok(unary(args)?.sin()),
        "cos" => Ok(unary(args)?.cos()),
        "tan" => Ok(unary(args)?.tan()),
        "log" => {
            let x = unary(args)?;
            if x <= 0.0 {
                return Err("log of a non-positive number".into());
            }
            Ok(x.ln())
        }
        "abs" => Ok(unary(args)?.abs()),
        "round" => Ok(unary(args)?.round()),
        "min" => match args {
            [a, b] => Ok(a.min(*b)),
            _ => Err("min expects exactly two arguments".into()),
        },
        "max" => match args {
            [a, b] => Ok(a.max(*b)),
            _ => Err("max expects exactly two arguments".into()),
        },
        other => Err(format!("Unknown function: {other}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn params(expr: &str) -> ToolParams {
        [("expression".to_string(), expr.to_string())].into()
    }

    #[test]
    fn simple_addition() {
        assert_eq!(evaluate("2 + 3").unwrap(), 5.0);
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    }

    #[test]
    fn parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn division_by_zero() {
        assert!(evaluate("1 / 0").is_err());
    }

    #[test]
    fn unary_negation() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
    }

    #[test]
    fn sqrt_function() {
        assert_eq!(evaluate("sqrt(16)").unwrap(), 4.0);
        assert_eq!(evaluate("sqrt(16) + 2").unwrap(), 6.0);
    }

    #[test]
    fn sqrt_of_negative_rejected() {
        assert!(evaluate("sqrt(-1)").is_err());
    }

    #[test]
    fn two_argument_functions() {
        assert_eq!(evaluate("min(3, 7)").unwrap(), 3.0);
        assert_eq!(evaluate("max(3, 7)").unwrap(), 7.0);
        assert!(evaluate("min(1)").is_err());
    }

    #[test]
    fn constants() {
        assert!((evaluate("2 * pi").unwrap() - std::f64::consts::TAU).abs() < 1e-10);
        assert!((evaluate("log(e)").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn nested_function_calls() {
        assert_eq!(evaluate("sqrt(abs(-16))").unwrap(), 4.0);
        assert_eq!(evaluate("round(10 / 3)").unwrap(), 3.0);
    }

    #[test]
    fn invalid_expression() {
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("").is_err());
        assert!(evaluate("frobnicate(2)").is_err());
    }

    #[test]
    fn whole_numbers_keep_one_decimal() {
        assert_eq!(format_value(6.0), "6.0");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-3.0), "-3.0");
    }

    #[tokio::test]
    async fn tool_execute_formats_output() {
        let tool = CalculatorTool;
        let result = tool.execute(&params("sqrt(16) + 2")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.content, "Calculation: sqrt(16) + 2 = 6.0");
    }

    #[tokio::test]
    async fn tool_reports_bad_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(&params("2 +")).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Calculation error"));
    }

    #[tokio::test]
    async fn missing_expression_is_invalid_arguments() {
        let tool = CalculatorTool;
        assert!(tool.execute(&ToolParams::new()).await.is_err());
    }
}
