//! The `sjt init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("sjt.toml").exists() {
        println!("sjt.toml already exists, skipping.");
    } else {
        std::fs::write("sjt.toml", SAMPLE_CONFIG)?;
        println!("Created sjt.toml");
    }

    if std::path::Path::new("sjt_questions.json").exists() {
        println!("sjt_questions.json already exists, skipping.");
    } else {
        std::fs::write("sjt_questions.json", SAMPLE_QUESTIONS)?;
        println!("Created sjt_questions.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit sjt_questions.json with your scenarios");
    println!("  2. Run: sjt validate --questions sjt_questions.json");
    println!("  3. Set spreadsheet_id and SJT_SHEETS_TOKEN, then run: sjt take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# sjt configuration

title = "Survei Kompetensi Digital & Literasi AI Calon Guru"
questions_file = "sjt_questions.json"
option_letters = ["A", "B", "C", "D"]
experience_choices = ["< 5 Semester", "3-6", "> 6 Semester"]

# Column order of the target sheet. Omit to use these defaults.
[layout]
timestamp_header = "Timestamp"
timestamp_format = "%Y-%m-%d %H:%M:%S"
total_header = "Total_Skor"
answer_suffix = "_Jwb"
points_suffix = "_Poin"

[[layout.respondent_columns]]
field = "name"
header = "Nama"

[[layout.respondent_columns]]
field = "institution"
header = "Sekolah"

[[layout.respondent_columns]]
field = "experience"
header = "Pengalaman"

# Without a [gateway] table submissions are only logged (demo mode).
# [gateway]
# type = "sheets"
# spreadsheet_id = "your-spreadsheet-id"
# access_token = "${SJT_SHEETS_TOKEN}"
# range = "Sheet1"
"#;

const SAMPLE_QUESTIONS: &str = r#"[
  {
    "id": "Q1",
    "dimensi": "Literasi AI",
    "skenario": "Beberapa siswa mengumpulkan esai yang seluruhnya ditulis oleh chatbot AI.",
    "pertanyaan": "Apa langkah pertama Anda?",
    "opsi": {
      "A": "Mendiskusikan aturan penggunaan AI bersama kelas",
      "B": "Memberi nilai nol tanpa penjelasan",
      "C": "Mengabaikannya karena sulit dibuktikan",
      "D": "Melaporkan siswa ke kepala sekolah"
    },
    "poin": {"A": 3, "B": 0, "C": -1, "D": 1}
  },
  {
    "id": "Q2",
    "dimensi": "Keamanan Data",
    "skenario": "Aplikasi kuis gratis meminta akses ke data pribadi seluruh siswa.",
    "pertanyaan": "Bagaimana Anda menanggapinya?",
    "opsi": {
      "A": "Langsung menggunakannya karena gratis",
      "B": "Membaca kebijakan privasi dan meminta izin sekolah",
      "C": "Mencari aplikasi lain yang tidak meminta data",
      "D": "Meminta siswa memutuskan sendiri"
    },
    "poin": {"A": -2, "B": 3, "C": 2, "D": 0}
  }
]
"#;
