//! Cycle-safe textual representation of values.
//!
//! Objects already being rendered higher up the chain are printed as
//! `(cycle: Type)` instead of being expanded again.

use super::{Seq, Value};
use std::fmt::{self, Write as _};

struct Renderer {
    ancestors: Vec<usize>,
}

impl Renderer {
    fn render(&mut self, value: &Value, out: &mut String) -> fmt::Result {
        match value {
            Value::Null => out.write_str("null"),
            Value::Unit => out.write_str("()"),
            Value::Bool(b) => write!(out, "{}", b),
            Value::I64(i) => write!(out, "{}", i),
            Value::U64(u) => write!(out, "{}", u),
            Value::F64(f) => write!(out, "{:?}", f),
            Value::Char(c) => write!(out, "{:?}", c),
            Value::Str(s) => write!(out, "{:?}", s),
            Value::Bytes(b) => write!(out, "{:?}", b),
            Value::Enum(e) => write!(out, "{}::{}", e.type_name, e.variant),
            Value::Array(s) | Value::List(s) => self.render_seq(s, '[', ']', out),
            Value::Set(s) => self.render_seq(s, '{', '}', out),
            Value::Map(m) => {
                out.write_char('{')?;
                for (i, (key, value)) in m.entries().iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    self.render(key, out)?;
                    out.write_str(": ")?;
                    self.render(value, out)?;
                }
                out.write_char('}')
            }
            Value::Object(obj) => {
                let identity = obj.identity();
                let object = obj.borrow();
                if self.ancestors.contains(&identity) {
                    return write!(out, "(cycle: {})", object.type_name());
                }
                self.ancestors.push(identity);
                out.write_str(object.type_name())?;
                if !object.members().is_empty() {
                    out.write_str(" { ")?;
                    for (i, member) in object.members().iter().enumerate() {
                        if i > 0 {
                            out.write_str(", ")?;
                        }
                        write!(out, "{}: ", member.name)?;
                        self.render(&member.value, out)?;
                    }
                    out.write_str(" }")?;
                }
                self.ancestors.pop();
                Ok(())
            }
        }
    }

    fn render_seq(&mut self, seq: &Seq, open: char, close: char, out: &mut String) -> fmt::Result {
        out.write_char(open)?;
        for (i, value) in seq.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            self.render(value, out)?;
        }
        out.write_char(close)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        Renderer {
            ancestors: Vec::new(),
        }
        .render(self, &mut out)?;
        f.write_str(&out)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
