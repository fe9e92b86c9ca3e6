//! Interactive menu loop.

use calculator_sdk::{Calculation, Operation, ResilientCalculator, ResultSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const EXIT_SELECTOR: &str = "5";
pub const INVALID_OPERATION: &str = "Invalid operation. Please select a number between 1 and 5.";
pub const INVALID_NUMBER: &str = "Invalid input. Please enter a valid number.";
const FALLBACK_SUFFIX: &str = " (computed locally, server unavailable)";

/// Drive the menu until `5` or end of input.
///
/// # Errors
/// Returns an error only if reading input or writing output fails.
pub async fn run<R, W>(calc: &ResilientCalculator, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        write_menu(&mut out).await?;

        let Some(selector) = lines.next_line().await? else {
            break;
        };
        let selector = selector.trim();
        if selector == EXIT_SELECTOR {
            break;
        }
        let Ok(op) = selector.parse::<Operation>() else {
            write_line(&mut out, INVALID_OPERATION).await?;
            continue;
        };

        out.write_all(b"Enter first number:\n").await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(a) = parse_number(&line) else {
            write_line(&mut out, INVALID_NUMBER).await?;
            continue;
        };

        out.write_all(b"Enter second number:\n").await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(b) = parse_number(&line) else {
            write_line(&mut out, INVALID_NUMBER).await?;
            continue;
        };

        let message = match calc.calculate(op, a, b).await {
            Ok(calculation) => format_result(op, a, b, calculation),
            Err(fault) => {
                tracing::error!(
                    op = %op,
                    kind = %fault.kind(),
                    error = %fault,
                    "calculation failed"
                );
                format!("\nError: {}\n", fault.message())
            }
        };
        out.write_all(message.as_bytes()).await?;
    }

    out.flush().await
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await
}

async fn write_menu<W: AsyncWrite + Unpin>(out: &mut W) -> std::io::Result<()> {
    out.write_all(
        b"\nSelect operation:\n1. Add\n2. Subtract\n3. Multiply\n4. Divide\n5. Exit\n",
    )
    .await?;
    out.flush().await
}

fn parse_number(line: &str) -> Option<f64> {
    line.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_result(op: Operation, a: f64, b: f64, calculation: Calculation) -> String {
    let suffix = match calculation.source {
        ResultSource::Remote => "",
        ResultSource::LocalFallback => FALLBACK_SUFFIX,
    };
    format!(
        "\nResult: {a} {} {b} = {}{suffix}\n",
        op.symbol(),
        calculation.value
    )
}
