//! Front end for the GLSL ES 1.00 subset the software device understands.
//!
//! Supported: `precision` statements, `attribute` and `uniform` declarations of
//! `float`/`vecN`, and a `void main()` whose statements assign expressions built from
//! literals, declared inputs, `+ - * /` and constructors to `gl_Position` or
//! `gl_FragColor`. Preprocessor lines are skipped. Diagnostics follow the
//! `ERROR: 0:<line>: '<token>' : <message>` shape of GL info logs.

mod lex;
mod syntax;

use std::collections::HashSet;
use std::fmt;

use crate::video::assets::ShaderStage;

use self::syntax::{BinaryOperator, Expression, Item, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Attribute,
    Uniform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub storage: Storage,
    /// Number of float components, 1 for `float` up to 4 for `vec4`.
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Position,
    FragColor,
}

/// A single compiler message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    line: u32,
    near: String,
    message: String,
}

impl Diagnostic {
    pub fn new<T: fmt::Display>(line: u32, near: T, message: &str) -> Self {
        Diagnostic {
            line,
            near: near.to_string(),
            message: message.to_owned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ERROR: 0:{}: '{}' : {}", self.line, self.near, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Const(f32),
    Load(String, usize),
    Neg(Box<Expr>),
    Binary(BinaryOperator, Box<Expr>, Box<Expr>),
    Construct(usize, Vec<Expr>),
}

/// A successfully compiled shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub declarations: Vec<Declaration>,
    /// Inputs read by `main`. Declared but unused inputs are inactive.
    pub active: HashSet<String>,
    body: Vec<(Output, Expr)>,
}

impl Module {
    /// Returns the declared, active attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(move |v| v.storage == Storage::Attribute && self.active.contains(&v.name))
    }

    /// Runs `main` and returns the value left in `output`. Inputs that `fetch` does
    /// not provide read as zero, which is what GL uses for unset uniforms.
    pub fn run<F>(&self, output: Output, fetch: F) -> [f32; 4]
    where
        F: Fn(&str) -> Option<[f32; 4]>,
    {
        let mut result = [0.0; 4];
        for (target, expr) in &self.body {
            if *target == output {
                let v = eval(expr, &fetch);
                result.copy_from_slice(&v[0..4]);
            }
        }

        result
    }
}

/// Compiles `source` for `stage`, returning the info log on failure.
pub fn compile(stage: ShaderStage, source: &str) -> Result<Module, String> {
    let lexemes = lex::tokenize(source).map_err(finish)?;
    let items = syntax::parse(&lexemes).map_err(finish)?;

    let mut checker = Checker {
        stage,
        declarations: Vec::new(),
        active: HashSet::new(),
        body: Vec::new(),
        has_main: false,
    };

    for item in items {
        checker.item(item).map_err(finish)?;
    }

    if !checker.has_main {
        let line = lexemes.last().map(|v| v.line).unwrap_or(1);
        return Err(finish(Diagnostic::new(line, "", "Missing main()")));
    }

    Ok(Module {
        declarations: checker.declarations,
        active: checker.active,
        body: checker.body,
    })
}

fn finish(err: Diagnostic) -> String {
    format!("{}\nERROR: 1 compilation errors.  No code generated.\n", err)
}

fn type_name(size: usize) -> &'static str {
    match size {
        1 => "float",
        2 => "vec2",
        3 => "vec3",
        _ => "vec4",
    }
}

/// Resolves names and component counts of parsed items.
struct Checker {
    stage: ShaderStage,
    declarations: Vec<Declaration>,
    active: HashSet<String>,
    body: Vec<(Output, Expr)>,
    has_main: bool,
}

impl Checker {
    fn item(&mut self, item: Item) -> Result<(), Diagnostic> {
        match item {
            Item::Precision(ty) => {
                if ty.text != "float" && ty.text != "int" {
                    return Err(Diagnostic::new(
                        ty.line,
                        &ty.text,
                        "illegal type for precision qualifier",
                    ));
                }

                Ok(())
            }
            Item::Variable {
                storage,
                line,
                size,
                name,
            } => {
                if storage == Storage::Attribute && self.stage != ShaderStage::Vertex {
                    return Err(Diagnostic::new(line, "attribute", "supported in vertex shaders only"));
                }

                if name.text.starts_with("gl_") {
                    return Err(Diagnostic::new(name.line, &name.text, "reserved built-in name"));
                }

                if self.declarations.iter().any(|v| v.name == name.text) {
                    return Err(Diagnostic::new(name.line, &name.text, "redefinition"));
                }

                self.declarations.push(Declaration {
                    name: name.text,
                    storage,
                    size,
                });

                Ok(())
            }
            Item::Function { name, body } => {
                if name.text != "main" {
                    return Err(Diagnostic::new(name.line, &name.text, "only main() may be defined"));
                }

                if self.has_main {
                    return Err(Diagnostic::new(name.line, "main", "function already has a body"));
                }

                for statement in body {
                    self.statement(statement)?;
                }

                self.has_main = true;
                Ok(())
            }
        }
    }

    fn statement(&mut self, statement: Statement) -> Result<(), Diagnostic> {
        let target = statement.target;
        let output = match target.text.as_str() {
            "gl_Position" if self.stage == ShaderStage::Vertex => Output::Position,
            "gl_FragColor" if self.stage == ShaderStage::Fragment => Output::FragColor,
            _ => {
                let msg = if self.declarations.iter().any(|v| v.name == target.text) {
                    "l-value required (can't modify an input)"
                } else {
                    "undeclared identifier"
                };

                return Err(Diagnostic::new(target.line, &target.text, msg));
            }
        };

        let (expr, size) = self.expression(statement.value)?;
        if size != 4 {
            let msg = format!("cannot convert from '{}' to 'vec4'", type_name(size));
            return Err(Diagnostic::new(statement.line, "=", &msg));
        }

        self.body.push((output, expr));
        Ok(())
    }

    fn expression(&mut self, expression: Expression) -> Result<(Expr, usize), Diagnostic> {
        match expression {
            Expression::Literal(v) => Ok((Expr::Const(v), 1)),
            Expression::Ident(name) => {
                let size = self
                    .declarations
                    .iter()
                    .find(|v| v.name == name.text)
                    .map(|v| v.size)
                    .ok_or_else(|| Diagnostic::new(name.line, &name.text, "undeclared identifier"))?;

                self.active.insert(name.text.clone());
                Ok((Expr::Load(name.text, size), size))
            }
            Expression::Neg(v) => {
                let (v, size) = self.expression(*v)?;
                Ok((Expr::Neg(Box::new(v)), size))
            }
            Expression::Binary(op, line, lhs, rhs) => {
                let (lhs, lsize) = self.expression(*lhs)?;
                let (rhs, rsize) = self.expression(*rhs)?;
                let size = binary_size(line, op, lsize, rsize)?;
                Ok((Expr::Binary(op, Box::new(lhs), Box::new(rhs)), size))
            }
            Expression::Construct(size, line, args) => self.construct(size, line, args),
        }
    }

    fn construct(
        &mut self,
        size: usize,
        line: u32,
        args: Vec<Expression>,
    ) -> Result<(Expr, usize), Diagnostic> {
        let mut exprs = Vec::with_capacity(args.len());
        let mut sizes = Vec::with_capacity(args.len());
        for arg in args {
            let (expr, arg_size) = self.expression(arg)?;
            exprs.push(expr);
            sizes.push(arg_size);
        }

        let total: usize = sizes.iter().sum();
        let last = sizes.last().cloned().unwrap_or(0);
        let broadcast = exprs.len() == 1 && last == 1;

        if !broadcast && total < size {
            return Err(Diagnostic::new(
                line,
                type_name(size),
                "not enough data provided for construction",
            ));
        }

        if exprs.len() > 1 && total - last >= size {
            return Err(Diagnostic::new(line, type_name(size), "too many arguments"));
        }

        Ok((Expr::Construct(size, exprs), size))
    }
}

fn binary_size(line: u32, op: BinaryOperator, lhs: usize, rhs: usize) -> Result<usize, Diagnostic> {
    if lhs == rhs || lhs == 1 || rhs == 1 {
        Ok(lhs.max(rhs))
    } else {
        let op = match op {
            BinaryOperator::Add => '+',
            BinaryOperator::Minus => '-',
            BinaryOperator::Mul => '*',
            BinaryOperator::Div => '/',
        };

        let msg = format!(
            "wrong operand types - no operation '{}' exists that takes a left-hand operand of \
             type '{}' and a right operand of type '{}'",
            op,
            type_name(lhs),
            type_name(rhs)
        );

        Err(Diagnostic::new(line, op, &msg))
    }
}

fn eval<F>(expr: &Expr, fetch: &F) -> Vec<f32>
where
    F: Fn(&str) -> Option<[f32; 4]>,
{
    match *expr {
        Expr::Const(v) => vec![v],
        Expr::Load(ref name, size) => match fetch(name) {
            Some(v) => v[0..size].to_vec(),
            None => vec![0.0; size],
        },
        Expr::Neg(ref v) => eval(v, fetch).into_iter().map(|v| -v).collect(),
        Expr::Binary(op, ref lhs, ref rhs) => {
            let lhs = eval(lhs, fetch);
            let rhs = eval(rhs, fetch);
            let len = lhs.len().max(rhs.len());
            (0..len)
                .map(|i| {
                    let a = lhs[if lhs.len() == 1 { 0 } else { i }];
                    let b = rhs[if rhs.len() == 1 { 0 } else { i }];
                    match op {
                        BinaryOperator::Add => a + b,
                        BinaryOperator::Minus => a - b,
                        BinaryOperator::Mul => a * b,
                        BinaryOperator::Div => a / b,
                    }
                })
                .collect()
        }
        Expr::Construct(size, ref args) => {
            let components: Vec<f32> = args.iter().flat_map(|v| eval(v, fetch)).collect();
            if components.len() == 1 {
                vec![components[0]; size]
            } else {
                components[0..size].to_vec()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const VS: &str = "
        // attribute that will receive data from a buffer
        attribute vec4 a_position;

        void main() {
            gl_Position = a_position;
        }
    ";

    const FS: &str = "
        precision mediump float;

        void main() {
            gl_FragColor = vec4(0.02, 1, 0.894, 1); // rgba
        }
    ";

    #[test]
    fn pass_through() {
        let module = compile(ShaderStage::Vertex, VS).unwrap();
        let attributes: Vec<_> = module.attributes().collect();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].name, "a_position");
        assert_eq!(attributes[0].size, 4);

        let position = module.run(Output::Position, |name| {
            assert_eq!(name, "a_position");
            Some([0.5, -0.5, 0.0, 1.0])
        });
        assert_eq!(position, [0.5, -0.5, 0.0, 1.0]);
    }

    #[test]
    fn constant_color() {
        let module = compile(ShaderStage::Fragment, FS).unwrap();
        assert_eq!(module.attributes().count(), 0);

        let color = module.run(Output::FragColor, |_| None);
        assert_eq!(color, [0.02, 1.0, 0.894, 1.0]);
    }

    #[test]
    fn expressions() {
        let src = "
            #version 100
            attribute vec2 a_position;
            uniform float u_scale;
            /* block
               comment */
            void main() {
                gl_Position = vec4(a_position * 2.0 - 1.0, -(0.5), 1);
                gl_Position = gl_Position_unused;
            }
        ";

        let err = compile(ShaderStage::Vertex, src).unwrap_err();
        assert!(err.contains("ERROR: 0:9: 'gl_Position_unused' : undeclared identifier"));

        let src = "
            attribute vec2 a_position;
            uniform float u_scale;
            attribute vec3 a_unused;
            void main(void) {
                gl_Position = vec4(a_position * 2.0 - 1.0, -(0.5), 1.0 + u_scale);
            }
        ";

        let module = compile(ShaderStage::Vertex, src).unwrap();
        assert_eq!(module.attributes().count(), 1);

        let position = module.run(Output::Position, |name| match name {
            "a_position" => Some([1.0, 0.25, 0.0, 1.0]),
            _ => None,
        });
        assert_eq!(position, [1.0, -0.5, -0.5, 1.0]);

        let module = compile(ShaderStage::Fragment, "void main() { gl_FragColor = vec4(0.5); }")
            .unwrap();
        assert_eq!(module.run(Output::FragColor, |_| None), [0.5; 4]);
    }

    #[test]
    fn syntax_error() {
        let src = "attribute vec4 a_position;\nvoid main() {\n  gl_Position = a_position\n}\n";
        let err = compile(ShaderStage::Vertex, src).unwrap_err();
        assert!(err.starts_with("ERROR: 0:4: '}' : syntax error"));
        assert!(err.contains("1 compilation errors"));
    }

    #[test]
    fn semantic_errors() {
        let err = compile(ShaderStage::Fragment, "attribute vec4 a;\nvoid main() {}").unwrap_err();
        assert!(err.contains("'attribute' : supported in vertex shaders only"));

        let err = compile(ShaderStage::Vertex, "attribute vec4 a;").unwrap_err();
        assert!(err.contains("Missing main()"));

        let err = compile(ShaderStage::Vertex, "void main() { gl_FragColor = vec4(1.0); }")
            .unwrap_err();
        assert!(err.contains("'gl_FragColor' : undeclared identifier"));

        let err = compile(ShaderStage::Fragment, "void main() { gl_FragColor = vec3(1.0); }")
            .unwrap_err();
        assert!(err.contains("cannot convert from 'vec3' to 'vec4'"));

        let err = compile(ShaderStage::Fragment, "void main() { gl_FragColor = vec4(1.0, 2.0); }")
            .unwrap_err();
        assert!(err.contains("not enough data provided for construction"));

        let err = compile(ShaderStage::Vertex, "attribute vec4 gl_a;\nvoid main() {}").unwrap_err();
        assert!(err.contains("reserved built-in name"));

        let err = compile(ShaderStage::Vertex, "void main() { gl_Position = vec4(1.0); } $")
            .unwrap_err();
        assert!(err.contains("'$' : unexpected character"));

        let err = compile(ShaderStage::Vertex, "void main() { /* never closed ").unwrap_err();
        assert!(err.contains("unterminated comment"));
    }
}
