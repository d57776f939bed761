//! Construcción de ejecutables.
//!
//! Una vez que se ha emitido código ensamblador a un archivo, este debe
//! ser ensamblado con `nasm` y enlazado con `ld` para producir un binario
//! ejecutable. Ambas herramientas se invocan como procesos externos y
//! cualquier fallo de estas se reporta al llamador.

use std::{
    ffi::{OsStr, OsString},
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use bitflags::bitflags;
use thiserror::Error;

/// Ensamblador.
const ASSEMBLER: &str = "nasm";

/// Enlazador.
const LINKER: &str = "ld";

bitflags! {
    /// Opciones a aplicar durante el enlazado.
    pub struct LinkOptions: u32 {
        /// Remover símbolos del ejecutable final.
        const STRIP = 0x01;
    }
}

/// Un error de ensamblado o enlazado.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkerError {
    /// No fue posible ejecutar la herramienta externa.
    #[error("Failed to run `{0}`")]
    Spawn(String, #[source] io::Error),

    /// La herramienta inició su ejecución, pero falló.
    #[error("`{0}` exited with {1}")]
    Failed(String, ExitStatus),
}

/// Rutas de los archivos que se producen para un ejecutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Ensamblador emitido, entrada de `nasm`.
    pub assembly: PathBuf,

    /// Código objeto, salida de `nasm` y entrada de `ld`.
    pub object: PathBuf,

    /// Ejecutable final.
    pub executable: PathBuf,
}

impl Artifacts {
    /// Deriva las rutas intermedias a partir de la ruta del ejecutable.
    ///
    /// `out` produce `out.asm`, `out.o` y `out`.
    pub fn for_output<P: AsRef<Path>>(executable: P) -> Self {
        let executable = executable.as_ref().to_path_buf();
        let with_suffix = |suffix: &str| {
            let mut path = OsString::from(executable.as_os_str());
            path.push(suffix);
            PathBuf::from(path)
        };

        Artifacts {
            assembly: with_suffix(".asm"),
            object: with_suffix(".o"),
            executable,
        }
    }
}

/// Ensamblado y enlazado de un programa ya emitido.
pub struct Linker {
    options: LinkOptions,
    assembler: OsString,
    linker: OsString,
}

impl Linker {
    /// Utiliza `nasm` y `ld` según se encuentren en `PATH`.
    pub fn new(options: LinkOptions) -> Self {
        Linker {
            options,
            assembler: ASSEMBLER.into(),
            linker: LINKER.into(),
        }
    }

    /// Reemplaza los comandos de ensamblado y enlazado.
    pub fn with_tools<A, L>(self, assembler: A, linker: L) -> Self
    where
        A: Into<OsString>,
        L: Into<OsString>,
    {
        Linker {
            assembler: assembler.into(),
            linker: linker.into(),
            ..self
        }
    }

    /// Produce `artifacts.executable` a partir de `artifacts.assembly`.
    ///
    /// El archivo de ensamblador ya debe existir.
    pub fn link(&self, artifacts: &Artifacts) -> Result<(), LinkerError> {
        let mut nasm = Command::new(&self.assembler);
        nasm.args(&["-f", "elf64", "-o"])
            .arg(&artifacts.object)
            .arg(&artifacts.assembly);

        run(&self.assembler, nasm)?;

        let mut ld = Command::new(&self.linker);
        ld.arg("-o")
            .arg(&artifacts.executable)
            .arg(&artifacts.object);

        if self.options.contains(LinkOptions::STRIP) {
            ld.arg("-s");
        }

        run(&self.linker, ld)
    }
}

fn run(tool: &OsStr, mut command: Command) -> Result<(), LinkerError> {
    log::info!("Running {:?}", command);

    let tool = || tool.to_string_lossy().into_owned();
    let status = command
        .status()
        .map_err(|error| LinkerError::Spawn(tool(), error))?;

    if status.success() {
        Ok(())
    } else {
        Err(LinkerError::Failed(tool(), status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn artifact_paths() {
        let artifacts = Artifacts::for_output("build/out");
        assert_eq!(artifacts.assembly, PathBuf::from("build/out.asm"));
        assert_eq!(artifacts.object, PathBuf::from("build/out.o"));
        assert_eq!(artifacts.executable, PathBuf::from("build/out"));
    }

    #[test]
    fn artifact_paths_keep_extension() {
        let artifacts = Artifacts::for_output("prog.bin");
        assert_eq!(artifacts.assembly, PathBuf::from("prog.bin.asm"));
        assert_eq!(artifacts.object, PathBuf::from("prog.bin.o"));
    }

    #[test]
    fn missing_tool_is_reported() {
        let tool = OsStr::new("hydro-test-no-such-tool");
        let error = run(tool, Command::new(tool)).unwrap_err();

        assert!(matches!(&error, LinkerError::Spawn(name, _) if name == "hydro-test-no-such-tool"));
        assert_eq!(error.to_string(), "Failed to run `hydro-test-no-such-tool`");
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_reported() {
        let tool = OsStr::new("false");
        let error = run(tool, Command::new(tool)).unwrap_err();

        assert!(matches!(error, LinkerError::Failed(name, status) if name == "false" && !status.success()));
    }

    /// Crea un script que registra sus argumentos en `log`.
    #[cfg(unix)]
    fn recording_tool(dir: &Path, name: &str, log: &Path, exit: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        let script = format!(
            "#!/bin/sh\necho \"{} $*\" >> '{}'\nexit {}\n",
            name,
            log.display(),
            exit
        );

        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hydro-link-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[cfg(unix)]
    #[test]
    fn assembler_and_linker_arguments() {
        let dir = scratch_dir("args");
        let log = dir.join("commands.log");
        let nasm = recording_tool(&dir, "nasm", &log, 0);
        let ld = recording_tool(&dir, "ld", &log, 0);

        let artifacts = Artifacts::for_output(dir.join("out"));
        Linker::new(LinkOptions::empty())
            .with_tools(&nasm, &ld)
            .link(&artifacts)
            .unwrap();

        Linker::new(LinkOptions::STRIP)
            .with_tools(&nasm, &ld)
            .link(&artifacts)
            .unwrap();

        let out = dir.join("out");
        let (asm, obj, exe) = (
            format!("{}.asm", out.display()),
            format!("{}.o", out.display()),
            out.display().to_string(),
        );

        let commands = fs::read_to_string(&log).unwrap();
        let commands: Vec<_> = commands.lines().collect();
        assert_eq!(
            commands,
            [
                format!("nasm -f elf64 -o {} {}", obj, asm),
                format!("ld -o {} {}", exe, obj),
                format!("nasm -f elf64 -o {} {}", obj, asm),
                format!("ld -o {} {} -s", exe, obj),
            ]
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn linker_is_skipped_after_assembler_failure() {
        let dir = scratch_dir("fail");
        let log = dir.join("commands.log");
        let nasm = recording_tool(&dir, "nasm", &log, 3);
        let ld = recording_tool(&dir, "ld", &log, 0);

        let error = Linker::new(LinkOptions::empty())
            .with_tools(&nasm, &ld)
            .link(&Artifacts::for_output(dir.join("out")))
            .unwrap_err();

        assert!(matches!(error, LinkerError::Failed(_, status) if status.code() == Some(3)));

        let commands = fs::read_to_string(&log).unwrap();
        assert_eq!(commands.lines().count(), 1);
        assert!(commands.starts_with("nasm "));

        fs::remove_dir_all(dir).unwrap();
    }
}
