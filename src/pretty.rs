use std::collections::HashMap;

use crate::ir::{Function, InstId, InstKind, Value, ValueOrigin};

/// Pretty-print a lowered `Function` as readable IR text, blocks in layout
/// order.
pub fn print_function(func: &Function) -> String {
    let mut pp = PrettyPrinter::new(func);
    pp.emit_function();
    pp.buf
}

struct PrettyPrinter<'a> {
    func: &'a Function,
    buf: String,
    results: HashMap<InstId, Value>,
}

impl<'a> PrettyPrinter<'a> {
    fn new(func: &'a Function) -> Self {
        let mut results = HashMap::new();
        for i in 0..func.num_values() {
            let v = Value(i as u32);
            if let ValueOrigin::Result(id) = func.value(v).origin {
                results.insert(id, v);
            }
        }
        Self { func, buf: String::new(), results }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn emit_function(&mut self) {
        let header = format!("fn {}() -> {} {{", self.func.name, self.func.result);
        self.write(&header);
        self.newline();

        for &b in self.func.layout() {
            let block = self.func.block(b);

            let mut line = format!("{b}");
            if let Some(&param) = block.params.first() {
                line.push_str(&format!("({param}: {})", self.func.value_ty(param)));
            }
            line.push(':');
            if self.func.postmatter == Some(b) {
                line.push_str("    ; postmatter");
            }
            self.write(&line);
            self.newline();

            for id in block.insts.iter().copied().chain(block.terminator) {
                let text = self.render_inst(id);
                self.write("    ");
                self.write(&text);
                self.newline();
            }
        }

        self.write("}");
        self.newline();
    }

    fn render_inst(&self, id: InstId) -> String {
        let inst = self.func.inst(id);
        match &inst.kind {
            InstKind::IConst(n) => format!("{} = iconst {n}", self.results[&id]),
            InstKind::FConst(x) => format!("{} = fconst {x}", self.results[&id]),
            InstKind::UnitConst => format!("{} = unit", self.results[&id]),
            InstKind::Release(v) => format!("release {v}"),
            InstKind::Jump { target, args } => {
                format!("jump {target}{}", render_args(args))
            }
            InstKind::BrIf { cond, then_dest, then_args, else_dest, else_args } => {
                format!(
                    "br_if {cond}, {then_dest}{}, {else_dest}{}",
                    render_args(then_args),
                    render_args(else_args)
                )
            }
            InstKind::Return(v) => format!("return {v}"),
            InstKind::Unreachable => "unreachable".to_string(),
        }
    }
}

fn render_args(args: &[Value]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let inner: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    format!("({})", inner.join(", "))
}
